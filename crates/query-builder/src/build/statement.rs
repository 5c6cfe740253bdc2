//! Builders for the single-row INSERT and UPDATE statements issued by the
//! entity layer. Values are always bound as `:paramN` placeholders.

use crate::{
    ast::statement::{Insert, Update},
    render::{Render, Renderer},
};
use model::{core::value::Value, records::params::Params};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    ast: Insert,
}

impl InsertBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            ast: Insert {
                table: table.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn value(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.ast.columns.push(column.to_string());
        self.ast.values.push(value.into());
        self
    }

    pub fn build(self) -> Insert {
        self.ast
    }

    pub fn to_sql(self) -> (String, Params) {
        render(&self.ast)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    ast: Update,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            ast: Update {
                table: table.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.ast.assignments.push((column.to_string(), value.into()));
        self
    }

    /// Adds an equality condition; conditions are joined with AND.
    pub fn condition(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.ast.conditions.push((column.to_string(), value.into()));
        self
    }

    pub fn build(self) -> Update {
        self.ast
    }

    pub fn to_sql(self) -> (String, Params) {
        render(&self.ast)
    }
}

fn render(statement: &impl Render) -> (String, Params) {
    let mut renderer = Renderer::new();
    statement.render(&mut renderer);
    let (sql, params) = renderer.finish();
    debug!(sql = %sql, params = params.len(), "Built statement");
    (sql, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_builder() {
        let (sql, params) = InsertBuilder::new("user")
            .value("first_name", "Ann")
            .value("created_at", Value::Null)
            .to_sql();

        assert_eq!(
            sql,
            "INSERT INTO user (first_name, created_at) VALUES (:param1, :param2)"
        );
        assert_eq!(params.get("param1"), Some(&Value::from("Ann")));
        assert_eq!(params.get("param2"), Some(&Value::Null));
    }

    #[test]
    fn test_update_builder() {
        let (sql, params) = UpdateBuilder::new("user")
            .set("first_name", "Bo")
            .set("updated_at", "2024-01-01 00:00:00")
            .condition("user_id", 4i64)
            .to_sql();

        assert_eq!(
            sql,
            "UPDATE user SET first_name = :param1, updated_at = :param2 WHERE user_id = :param3"
        );
        assert_eq!(params.get("param3"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_builders_expose_ast() {
        let insert = InsertBuilder::new("t").value("a", 1i64).build();
        assert_eq!(insert.columns, vec!["a"]);

        let update = UpdateBuilder::new("t").set("a", 1i64).build();
        assert!(update.conditions.is_empty());
    }
}
