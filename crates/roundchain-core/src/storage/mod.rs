mod config;
pub mod database;

pub use config::{Config, LoggingConfig, PolicyConfig, SessionConfig};
pub use database::{Database, TemplateSummary};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `ROUNDCHAIN_HOME` wins when set. Otherwise `~/.config/roundchain`, or
/// `~/.config/roundchain-dev` with `ROUNDCHAIN_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ROUNDCHAIN_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ROUNDCHAIN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("roundchain-dev")
            } else {
                base_dir.join("roundchain")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
