//! dexedit core: record model, duplicate detection and resolution.

pub mod config;
pub mod detector;
pub mod equivalence;
pub mod error;
pub mod models;
pub mod mutation;
pub mod resolution;
pub mod session;
pub mod upload;

pub use config::{AppConfig, DedupConfig, ExportConfig, SpeciesConfig};
pub use detector::detect;
pub use equivalence::{DedupMode, grouping_key};
pub use error::{EditorError, ExitCode, Result};
pub use models::*;
pub use resolution::{Resolution, keep_first, keep_last, remove_all_duplicates, remove_selected};
pub use session::{GroupingState, ResolveAction, Session};
pub use upload::{parse_records, read_records, to_pretty_json, write_records};
