use thiserror::Error;

/// All errors that can occur in dexedit-core.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Nothing selected for removal")]
    NothingSelected,

    #[error("Cannot remove entire duplicate group '{0}'. At least one record must remain.")]
    EntireGroupSelected(String),

    #[error("Index {index} is not a member of duplicate group '{key}'")]
    NotInGroup { key: String, index: usize },

    #[error("Duplicate group not found: {0}")]
    GroupNotFound(String),

    #[error("Index {index} out of range for list of {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Duplicate groups are stale; re-run detection before resolving")]
    StaleGrouping,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl EditorError {
    /// Validation failures are rejected before any mutation; the session is unchanged.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NothingSelected
                | Self::EntireGroupSelected(_)
                | Self::NotInGroup { .. }
                | Self::GroupNotFound(_)
                | Self::IndexOutOfRange { .. }
                | Self::StaleGrouping
        )
    }

    /// Exit code the CLI reports for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::GroupNotFound(_) => ExitCode::NotFound,
            Self::Io(_) => ExitCode::FileSystemError,
            _ if self.is_validation() => ExitCode::InvalidArgs,
            _ => ExitCode::GeneralError,
        }
    }
}

/// Exit codes reported by the CLI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
    NetworkError = 6,
}

pub type Result<T> = std::result::Result<T, EditorError>;
