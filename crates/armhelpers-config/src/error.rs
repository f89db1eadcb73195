use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "configuration file not found. Looked for:\n\
        - current directory: armhelpers.local.yaml, armhelpers.yaml, .armhelpers.yaml\n\
        - ~/.config/armhelpers/config.yaml\n\
        A path can also be given with the ARMHELPERS_CONFIG environment variable"
    )]
    ConfigFileNotFound,

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
