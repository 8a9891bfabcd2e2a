//! Engine configuration
//!
//! Read from a TOML file; every field has a default so a missing file or
//! a partial file both work.
//!
//! ```toml
//! data_dir = "data"
//! show_npc_quest_indicators = true
//! special_order_type = "QF_NPC"
//! quest_id_base = 1000000
//! hot_reload = false
//! log_filter = "quest_trigger_engine=info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "QUEST_ENGINE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding `quests/` and `offers/`
    pub data_dir: PathBuf,
    /// Draw the quest marker above NPCs that have something on offer
    pub show_npc_quest_indicators: bool,
    /// Order type marking host special orders that belong to this engine
    pub special_order_type: String,
    /// First id allocated to quests without a fixed host id
    pub quest_id_base: i64,
    /// Watch `data_dir` and reload content on change
    pub hot_reload: bool,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            show_npc_quest_indicators: true,
            special_order_type: "QF_NPC".to_string(),
            quest_id_base: 1_000_000,
            hot_reload: false,
            log_filter: "quest_trigger_engine=info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from `path`, falling back to defaults if the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| EngineError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Config path from the environment, or the default path
    pub fn path_from_env() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::load(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "show_npc_quest_indicators = false\nquest_id_base = 77\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert!(!config.show_npc_quest_indicators);
        assert_eq!(config.quest_id_base, 77);
        assert_eq!(config.special_order_type, "QF_NPC");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "quest_id_base = \"lots\"").unwrap();

        assert!(matches!(EngineConfig::load(&path), Err(EngineError::Load { .. })));
    }
}
