use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::equivalence::DedupMode;
use crate::error::Result;

/// Root application configuration, loaded from `~/.config/dexedit/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dedup: DedupConfig,
    pub export: ExportConfig,
    pub species: SpeciesConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub mode: DedupMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name used when the list did not come from an upload.
    pub default_file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    pub base_url: String,
    pub min_interval_ms: u64,
    pub max_retries: u32,
    pub cache_ttl_secs: u64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_file_name: "pokemon.json".to_string(),
        }
    }
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            min_interval_ms: 200,
            max_retries: 3,
            cache_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/dexedit/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("DEXEDIT_CONFIG") {
            return PathBuf::from(path);
        }

        user_config_dir().join("dexedit").join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Flat `section.key = value` listing for display.
    pub fn key_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("dedup.mode", self.dedup.mode.to_string()),
            ("export.default_file_name", self.export.default_file_name.clone()),
            ("species.base_url", self.species.base_url.clone()),
            ("species.min_interval_ms", self.species.min_interval_ms.to_string()),
            ("species.max_retries", self.species.max_retries.to_string()),
            ("species.cache_ttl_secs", self.species.cache_ttl_secs.to_string()),
        ]
    }
}

/// Platform config directory, else `$HOME/.config`, else the working directory.
fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
}
