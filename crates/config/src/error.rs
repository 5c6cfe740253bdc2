use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("no operation mode configured")]
    MissingMode,

    #[error("unknown operation mode `{0}`")]
    UnknownOperationMode(String),

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
