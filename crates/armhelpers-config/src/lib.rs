pub mod config;
pub mod error;

pub use config::*;
pub use error::*;

use std::path::PathBuf;

/// Environment variable naming the configuration file directly
pub const CONFIG_PATH_ENV: &str = "ARMHELPERS_CONFIG";

const CANDIDATES: [&str; 3] = ["armhelpers.local.yaml", "armhelpers.yaml", ".armhelpers.yaml"];

/// Locate the configuration file
///
/// Search order:
/// 1. `ARMHELPERS_CONFIG`
/// 2. current directory: armhelpers.local.yaml, armhelpers.yaml, .armhelpers.yaml
/// 3. ~/.config/armhelpers/config.yaml
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("armhelpers").join("config.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Load, override from the environment and validate
///
/// `path` wins over discovery. Without a file anywhere the configuration is
/// built from the environment alone.
pub fn load_config(path: Option<PathBuf>) -> Result<ArmConfig> {
    let path = match path {
        Some(path) => Some(path),
        None => match find_config_file() {
            Ok(path) => Some(path),
            Err(ConfigError::ConfigFileNotFound) => None,
            Err(e) => return Err(e),
        },
    };

    let mut config = match path {
        Some(path) => ArmConfig::from_file(&path)?,
        None => ArmConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
