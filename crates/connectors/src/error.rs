use thiserror::Error;

/// Errors from the database layer. Driver failures carry the driver's own
/// code and message unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DbError {
    #[error("driver error [{code}]: {message}")]
    Driver { code: String, message: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("no database name given for the connection")]
    MissingDatabase,

    #[error("connection slot poisoned by a panic in another thread")]
    Poisoned,
}

impl DbError {
    pub fn driver(code: impl Into<String>, message: impl Into<String>) -> Self {
        DbError::Driver {
            code: code.into(),
            message: message.into(),
        }
    }
}
