// Config file adapter - TOML or YAML configuration with env overrides

use std::path::{Path, PathBuf};

use crate::config::CutterConfig;
use crate::domain::errors::*;
use crate::ports::*;

/// Files probed, in order, when no explicit config path is given
const SEARCH_PATHS: &[&str] = &["beatcut.toml", "config/beatcut.toml", "beatcut.yaml"];

/// Configuration adapter reading TOML or YAML files
pub struct TomlConfigAdapter {
    search_root: PathBuf,
    use_env: bool,
}

impl TomlConfigAdapter {
    /// Search relative to the working directory and honour `BEATCUT_*` variables
    pub fn new() -> Self {
        Self {
            search_root: PathBuf::from("."),
            use_env: true,
        }
    }

    /// Search relative to `root`, ignoring the process environment
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            search_root: root.into(),
            use_env: false,
        }
    }

    fn find_default(&self) -> Option<PathBuf> {
        SEARCH_PATHS
            .iter()
            .map(|p| self.search_root.join(p))
            .find(|p| p.is_file())
    }

    fn parse_file(path: &Path) -> Result<CutterConfig, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| {
                DomainError::ConfigError(format!("Failed to parse YAML config: {}", e))
            })
        } else {
            toml::from_str(&content).map_err(|e| {
                DomainError::ConfigError(format!("Failed to parse TOML config: {}", e))
            })
        }
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for TomlConfigAdapter {
    fn load_config(&self, file_path: Option<&Path>) -> Result<CutterConfig, DomainError> {
        let source = match file_path {
            Some(path) if !path.is_file() => {
                return Err(DomainError::ConfigError(format!(
                    "Config file does not exist: {}",
                    path.display()
                )))
            }
            Some(path) => Some(path.to_path_buf()),
            None => self.find_default(),
        };

        let mut config = match &source {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::parse_file(path)?
            }
            None => CutterConfig::default(),
        };

        if self.use_env {
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
        }
        config.validate()?;

        Ok(config)
    }
}
