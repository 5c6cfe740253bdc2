use config::error::ConfigError;
use connectors::error::DbError;
use mapping::error::MappingError;
use model::core::value::ValueError;
use query_builder::error::BuildError;
use thiserror::Error;

/// Errors surfaced to callers of the entity layer. None of them is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrmError {
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("unknown operation mode `{0}`")]
    UnknownOperationMode(String),

    /// Alias resolution failures, unknown fields, primary-key misuse.
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl OrmError {
    pub fn internal(detail: impl Into<String>) -> Self {
        OrmError::Internal(detail.into())
    }
}

impl From<BuildError> for OrmError {
    fn from(err: BuildError) -> Self {
        OrmError::Internal(err.to_string())
    }
}

impl From<MappingError> for OrmError {
    fn from(err: MappingError) -> Self {
        OrmError::Internal(err.to_string())
    }
}

impl From<ConfigError> for OrmError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownOperationMode(mode) => OrmError::UnknownOperationMode(mode),
            other => OrmError::ConfigurationInvalid(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: OrmError = BuildError::MissingFrom.into();
        assert_eq!(err, OrmError::Internal("query has no FROM table".into()));

        let err: OrmError = ConfigError::UnknownOperationMode("x".into()).into();
        assert_eq!(err, OrmError::UnknownOperationMode("x".into()));

        let err: OrmError = ConfigError::MissingMode.into();
        assert!(matches!(err, OrmError::ConfigurationInvalid(_)));
    }
}
