use crate::{
    error::DbError,
    executor::{Connector, Executor},
    sql::mysql::{params::named_params, row::to_row},
};
use config::settings::ConnectTarget;
use model::records::{params::Params, row::Row};
use mysql_async::{Conn, OptsBuilder, Row as MySqlRow, prelude::Queryable};
use tokio::runtime::{Builder, Runtime};
use tracing::{info, trace, warn};

impl From<mysql_async::Error> for DbError {
    fn from(err: mysql_async::Error) -> Self {
        match err {
            mysql_async::Error::Server(server) => DbError::Driver {
                code: server.code.to_string(),
                message: server.message,
            },
            mysql_async::Error::Io(_) | mysql_async::Error::Url(_) => {
                DbError::Connection(err.to_string())
            }
            other => DbError::Driver {
                code: "HY000".to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

impl Connector for MySqlConnector {
    fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn Executor>, DbError> {
        Ok(Box::new(MySqlExecutor::connect(target)?))
    }
}

/// A single MySQL connection driven by its own current-thread runtime, so
/// that each call blocks the caller until the server answers.
pub struct MySqlExecutor {
    runtime: Runtime,
    conn: Option<Conn>,
}

impl MySqlExecutor {
    pub fn connect(target: &ConnectTarget) -> Result<Self, DbError> {
        if target.database.is_empty() {
            return Err(DbError::MissingDatabase);
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbError::Connection(format!("cannot start runtime: {e}")))?;

        let opts = OptsBuilder::default()
            .ip_or_hostname(target.host.clone())
            .tcp_port(target.port)
            .user(Some(target.user.clone()))
            .pass(Some(target.password.clone()))
            .db_name(Some(target.database.clone()));

        let conn = runtime.block_on(Conn::new(opts))?;
        info!(host = %target.host, database = %target.database, "Connected to MySQL");

        Ok(MySqlExecutor {
            runtime,
            conn: Some(conn),
        })
    }

    fn conn(&mut self) -> Result<&mut Conn, DbError> {
        self.conn
            .as_mut()
            .ok_or_else(|| DbError::Connection("connection already closed".to_string()))
    }

    fn run(&mut self, sql: &str) -> Result<(), DbError> {
        let runtime = &self.runtime;
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| DbError::Connection("connection already closed".to_string()))?;
        runtime.block_on(conn.query_drop(sql))?;
        Ok(())
    }
}

impl Executor for MySqlExecutor {
    fn prepare_and_execute(&mut self, sql: &str, params: &Params) -> Result<Vec<Row>, DbError> {
        let runtime = &self.runtime;
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| DbError::Connection("connection already closed".to_string()))?;

        let rows: Vec<MySqlRow> = runtime.block_on(conn.exec(sql, named_params(params)))?;
        trace!(rows = rows.len(), "Statement returned");
        Ok(rows.iter().map(to_row).collect())
    }

    fn last_insert_id(&mut self) -> Result<String, DbError> {
        Ok(self
            .conn()?
            .last_insert_id()
            .map_or_else(|| "0".to_string(), |id| id.to_string()))
    }

    fn begin(&mut self) -> Result<(), DbError> {
        self.run("START TRANSACTION")
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.run("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.run("ROLLBACK")
    }
}

impl Drop for MySqlExecutor {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = self.runtime.block_on(conn.disconnect()) {
                warn!("Error closing MySQL connection: {e}");
            }
        }
    }
}
