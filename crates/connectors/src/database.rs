use crate::{
    error::DbError,
    executor::{Connector, Executor},
};
use config::settings::ConnectTarget;
use model::records::{params::Params, row::Row};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// A handle on one database, with a connection slot opened on first use.
///
/// Clones share the slot, and with it the connection and any transaction in
/// progress. [`Database::independent`] gives a handle with a slot of its own.
#[derive(Clone)]
pub struct Database {
    target: ConnectTarget,
    connector: Arc<dyn Connector>,
    slot: Arc<Mutex<Option<Box<dyn Executor>>>>,
}

impl Database {
    pub fn new(connector: Arc<dyn Connector>, target: ConnectTarget) -> Self {
        Database {
            target,
            connector,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Same database, separate connection.
    pub fn independent(&self) -> Self {
        Database::new(Arc::clone(&self.connector), self.target.clone())
    }

    pub fn name(&self) -> &str {
        &self.target.database
    }

    pub fn shares_connection_with(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    pub fn is_connected(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Runs `f` on the connection, opening it first if needed.
    pub fn with_executor<T>(
        &self,
        f: impl FnOnce(&mut dyn Executor) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let mut slot = self.slot.lock().map_err(|_| DbError::Poisoned)?;
        let executor = match &mut *slot {
            Some(executor) => executor,
            empty => {
                info!(database = %self.target.database, host = %self.target.host, "Opening connection");
                empty.insert(self.connector.connect(&self.target)?)
            }
        };
        f(&mut **executor)
    }

    pub fn query(&self, sql: &str, params: &Params) -> Result<Vec<Row>, DbError> {
        let names: Vec<&str> = params.iter().map(|(name, _)| name).collect();
        debug!(database = %self.target.database, sql, params = ?names, "Executing statement");
        self.with_executor(|executor| executor.prepare_and_execute(sql, params))
    }

    /// Runs a statement whose result set is of no interest.
    pub fn execute(&self, sql: &str, params: &Params) -> Result<(), DbError> {
        self.query(sql, params).map(|_| ())
    }

    pub fn last_insert_id(&self) -> Result<String, DbError> {
        self.with_executor(|executor| executor.last_insert_id())
    }

    pub fn begin(&self) -> Result<(), DbError> {
        info!(database = %self.target.database, "Begin transaction");
        self.with_executor(|executor| executor.begin())
    }

    pub fn commit(&self) -> Result<(), DbError> {
        info!(database = %self.target.database, "Commit transaction");
        self.with_executor(|executor| executor.commit())
    }

    pub fn rollback(&self) -> Result<(), DbError> {
        info!(database = %self.target.database, "Rollback transaction");
        self.with_executor(|executor| executor.rollback())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("target", &self.target)
            .field("connected", &self.is_connected())
            .finish()
    }
}
