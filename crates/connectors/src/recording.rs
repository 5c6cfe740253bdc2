//! In-memory connector for tests: records every statement, replays queued
//! result sets and insert ids, and counts transaction calls.
//!
//! Only statements starting with `SELECT` consume a queued result set, so a
//! test can queue the rows of its reads without accounting for writes.

use crate::{
    error::DbError,
    executor::{Connector, Executor},
};
use config::settings::ConnectTarget;
use model::records::{params::Params, row::Row};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub database: String,
    pub sql: String,
    pub params: Params,
}

#[derive(Debug, Default)]
struct State {
    statements: Vec<RecordedStatement>,
    results: VecDeque<Vec<Row>>,
    insert_ids: VecDeque<String>,
    failure: Option<DbError>,
    connections: usize,
    begins: usize,
    commits: usize,
    rollbacks: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    state: Arc<Mutex<State>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues the result set for the next SELECT.
    pub fn queue_rows(&self, rows: Vec<Row>) {
        self.state().results.push_back(rows);
    }

    pub fn queue_insert_id(&self, id: impl Into<String>) {
        self.state().insert_ids.push_back(id.into());
    }

    /// Makes the next statement fail with `error`.
    pub fn fail_next(&self, error: DbError) {
        self.state().failure = Some(error);
    }

    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.state().statements.clone()
    }

    pub fn last_statement(&self) -> Option<RecordedStatement> {
        self.state().statements.last().cloned()
    }

    pub fn statement_count(&self) -> usize {
        self.state().statements.len()
    }

    pub fn connections(&self) -> usize {
        self.state().connections
    }

    /// `(begins, commits, rollbacks)`
    pub fn transactions(&self) -> (usize, usize, usize) {
        let state = self.state();
        (state.begins, state.commits, state.rollbacks)
    }
}

impl Connector for RecordingConnector {
    fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn Executor>, DbError> {
        self.state().connections += 1;
        Ok(Box::new(RecordingExecutor {
            database: target.database.clone(),
            connector: self.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct RecordingExecutor {
    database: String,
    connector: RecordingConnector,
}

impl Executor for RecordingExecutor {
    fn prepare_and_execute(&mut self, sql: &str, params: &Params) -> Result<Vec<Row>, DbError> {
        let mut state = self.connector.state();
        state.statements.push(RecordedStatement {
            database: self.database.clone(),
            sql: sql.to_string(),
            params: params.clone(),
        });
        if let Some(error) = state.failure.take() {
            return Err(error);
        }

        let is_select = sql
            .trim_start()
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("select"));
        if is_select {
            Ok(state.results.pop_front().unwrap_or_default())
        } else {
            Ok(Vec::new())
        }
    }

    fn last_insert_id(&mut self) -> Result<String, DbError> {
        Ok(self
            .connector
            .state()
            .insert_ids
            .pop_front()
            .unwrap_or_else(|| "0".to_string()))
    }

    fn begin(&mut self) -> Result<(), DbError> {
        self.connector.state().begins += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.connector.state().commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.connector.state().rollbacks += 1;
        Ok(())
    }
}
