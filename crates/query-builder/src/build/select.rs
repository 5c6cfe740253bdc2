//! Fluent builder assembling a SELECT from free-form fragments.
//!
//! Conditions, join conditions, group/order expressions and an explicit
//! select list may reference entity fields as `alias.field`; `build` rewrites
//! them into `alias.column`. Fragments added through `expression` are
//! emitted verbatim.

use crate::{
    ast::{
        common::{JoinClause, JoinKind, Limit, OrderBy, OrderDir, TableReference},
        select::Select,
    },
    error::BuildError,
    render::{Render, Renderer},
    resolve::resolve_tokens,
};
use mapping::context::MappingContext;
use tracing::debug;

/// Alias given to the base table when none is supplied.
pub const DEFAULT_ALIAS: &str = "t1";

/// An explicit select list, from one expression or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(pub Vec<String>);

impl From<&str> for Selection {
    fn from(expr: &str) -> Self {
        Selection(vec![expr.to_string()])
    }
}

impl From<String> for Selection {
    fn from(expr: String) -> Self {
        Selection(vec![expr])
    }
}

impl From<Vec<String>> for Selection {
    fn from(exprs: Vec<String>) -> Self {
        Selection(exprs)
    }
}

impl From<Vec<&str>> for Selection {
    fn from(exprs: Vec<&str>) -> Self {
        Selection(exprs.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Selection {
    fn from(exprs: [&str; N]) -> Self {
        Selection(exprs.iter().map(|e| e.to_string()).collect())
    }
}

#[derive(Debug)]
pub struct QueryBuilder<'a> {
    ctx: &'a MappingContext,
    ast: Select,
    deferred: Option<BuildError>,
    query: String,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(ctx: &'a MappingContext) -> Self {
        Self {
            ctx,
            ast: Select::default(),
            deferred: None,
            query: String::new(),
        }
    }

    /// Replaces the select list. Without it, `alias.*` is selected for the
    /// base table and for every join.
    pub fn select(mut self, selection: impl Into<Selection>) -> Self {
        self.ast.columns = Some(selection.into().0);
        self
    }

    /// Sets the base table. An empty alias becomes [`DEFAULT_ALIAS`].
    pub fn from(mut self, table: &str, alias: &str) -> Self {
        let alias = if alias.is_empty() { DEFAULT_ALIAS } else { alias };
        self.ast.from = Some(self.reference(table, alias));
        self
    }

    pub fn join(mut self, table: &str, alias: &str, condition: &str, kind: JoinKind) -> Self {
        let reference = self.reference(table, alias);
        self.ast.joins.push(JoinClause {
            reference,
            condition: condition.to_string(),
            kind,
        });
        self
    }

    pub fn left_join(self, table: &str, alias: &str, condition: &str) -> Self {
        self.join(table, alias, condition, JoinKind::Left)
    }

    pub fn inner_join(self, table: &str, alias: &str, condition: &str) -> Self {
        self.join(table, alias, condition, JoinKind::Inner)
    }

    pub fn right_join(self, table: &str, alias: &str, condition: &str) -> Self {
        self.join(table, alias, condition, JoinKind::Right)
    }

    pub fn full_join(self, table: &str, alias: &str, condition: &str) -> Self {
        self.join(table, alias, condition, JoinKind::Full)
    }

    /// Adds a join written as a single `"table alias ON condition"` string.
    /// A string not in that shape makes `build` fail.
    pub fn join_clause(mut self, spec: &str, kind: JoinKind) -> Self {
        match parse_join(spec) {
            Some((table, alias, condition)) => self.join(table, alias, &condition, kind),
            None => {
                self.deferred
                    .get_or_insert_with(|| BuildError::MalformedJoin(spec.to_string()));
                self
            }
        }
    }

    pub fn left_join_clause(self, spec: &str) -> Self {
        self.join_clause(spec, JoinKind::Left)
    }

    pub fn inner_join_clause(self, spec: &str) -> Self {
        self.join_clause(spec, JoinKind::Inner)
    }

    pub fn where_clause(mut self, condition: &str) -> Self {
        self.ast.and_conditions.push(condition.to_string());
        self
    }

    pub fn and(self, condition: &str) -> Self {
        self.where_clause(condition)
    }

    /// Adds an OR condition. OR conditions follow the AND conditions without
    /// grouping, so `where(A).and(B).or(C)` means `(A AND B) OR C`.
    pub fn or(mut self, condition: &str) -> Self {
        self.ast.or_conditions.push(condition.to_string());
        self
    }

    pub fn group_by(mut self, expr: &str) -> Self {
        self.ast.group_by.push(expr.to_string());
        self
    }

    pub fn order_by(mut self, field: &str, direction: OrderDir) -> Self {
        self.ast.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: u64, offset: u64) -> Self {
        self.ast.limit = Some(Limit { limit, offset });
        self
    }

    /// Adds trusted SQL to the WHERE clause, in parentheses and ahead of the
    /// conditions. No token rewriting is applied.
    pub fn expression(mut self, sql: &str) -> Self {
        self.ast.expressions.push(sql.to_string());
        self
    }

    /// Base and joined table references, in query order.
    pub fn aliases(&self) -> Vec<TableReference> {
        self.ast.tables()
    }

    /// The SQL of the last successful `build`, empty before it.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn build(&mut self) -> Result<String, BuildError> {
        if let Some(err) = &self.deferred {
            return Err(err.clone());
        }
        if self.ast.from.is_none() {
            return Err(BuildError::MissingFrom);
        }

        let resolved = self.resolve()?;
        let mut renderer = Renderer::new();
        resolved.render(&mut renderer);
        let (sql, _) = renderer.finish();

        debug!(sql = %sql, "Built select query");
        self.query = sql.clone();
        Ok(sql)
    }

    /// Copy of the fragments with every `alias.field` token rewritten.
    fn resolve(&self) -> Result<Select, BuildError> {
        let tables = self.ast.tables();
        let resolve = |text: &str| resolve_tokens(text, &tables, self.ctx);
        let resolve_all = |texts: &[String]| -> Result<Vec<String>, BuildError> {
            texts.iter().map(|t| resolve(t.as_str())).collect()
        };

        let columns = match &self.ast.columns {
            Some(columns) => Some(resolve_all(columns.as_slice())?),
            None => None,
        };

        let joins = self
            .ast
            .joins
            .iter()
            .map(|join| {
                Ok(JoinClause {
                    condition: resolve(join.condition.as_str())?,
                    ..join.clone()
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        let order_by = self
            .ast
            .order_by
            .iter()
            .map(|order| {
                Ok(OrderBy {
                    field: resolve(order.field.as_str())?,
                    direction: order.direction,
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        Ok(Select {
            columns,
            from: self.ast.from.clone(),
            joins,
            expressions: self.ast.expressions.clone(),
            and_conditions: resolve_all(self.ast.and_conditions.as_slice())?,
            or_conditions: resolve_all(self.ast.or_conditions.as_slice())?,
            group_by: resolve_all(self.ast.group_by.as_slice())?,
            order_by,
            limit: self.ast.limit,
        })
    }

    fn reference(&self, table: &str, alias: &str) -> TableReference {
        TableReference {
            table: table.to_string(),
            alias: alias.to_string(),
            bound_type: self.ctx.class_for_table(table),
        }
    }
}

/// Splits `"table alias ON condition"`; the `ON` keyword is case-insensitive.
fn parse_join(spec: &str) -> Option<(&str, &str, String)> {
    let mut parts = spec.split_whitespace();
    let table = parts.next()?;
    let alias = parts.next()?;
    if !parts.next()?.eq_ignore_ascii_case("on") {
        return None;
    }
    let condition = parts.collect::<Vec<_>>().join(" ");
    if condition.is_empty() {
        return None;
    }
    Some((table, alias, condition))
}
