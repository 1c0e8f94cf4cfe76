use std::path::{Path, PathBuf};

use bodystyle_common::{Error, Result};
use tracing::{debug, info};

use crate::model::{AppConfig, OutputFormat};

pub const ENV_LOG_LEVEL: &str = "BODYSTYLE_LOG_LEVEL";
pub const ENV_OUTPUT_FORMAT: &str = "BODYSTYLE_OUTPUT_FORMAT";

/// Locates, reads and layers the configuration.
///
/// Precedence, lowest first: built-in defaults, the TOML file, environment
/// variables. Command-line flags are applied by the caller on top.
pub struct ConfigLoader;

impl ConfigLoader {
    /// `~/.bodystyle`, or `./.bodystyle` when no home directory is known.
    pub fn default_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bodystyle")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist. The default file is optional.
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        let mut config = match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => {
                let default = Self::default_config_path();
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    debug!("no config at {}, using defaults", default.display());
                    AppConfig::default()
                }
            }
        };

        Self::apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<AppConfig> {
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid config: {e}")))
    }

    /// Apply environment overrides, reading variables through `lookup`.
    pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            config.log.level = level;
        }
        if let Some(format) = lookup(ENV_OUTPUT_FORMAT) {
            config.output.format = format
                .parse::<OutputFormat>()
                .map_err(|e| Error::Config(format!("{ENV_OUTPUT_FORMAT}: {e}")))?;
        }
        Ok(())
    }
}
