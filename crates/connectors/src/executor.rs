use crate::error::DbError;
use config::settings::ConnectTarget;
use model::records::{params::Params, row::Row};

/// One open database connection.
///
/// Statements use named `:name` placeholders bound from `params`. Every call
/// blocks until the database has answered.
pub trait Executor: Send {
    /// Runs `sql` and returns its rows; statements without a result set
    /// return no rows.
    fn prepare_and_execute(&mut self, sql: &str, params: &Params) -> Result<Vec<Row>, DbError>;

    /// Key generated by the last INSERT on this connection.
    fn last_insert_id(&mut self) -> Result<String, DbError>;

    fn begin(&mut self) -> Result<(), DbError>;

    fn commit(&mut self) -> Result<(), DbError>;

    fn rollback(&mut self) -> Result<(), DbError>;
}

/// Opens connections.
pub trait Connector: Send + Sync {
    fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn Executor>, DbError>;
}
