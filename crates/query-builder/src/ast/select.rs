use super::common::{JoinClause, Limit, OrderBy, TableReference};

/// Accumulated clause fragments of one SELECT.
///
/// `expressions` are trusted SQL emitted first in the WHERE clause, each in
/// parentheses. `and_conditions` follow joined by AND, then every entry of
/// `or_conditions` is appended with OR, without grouping: `A AND B OR C`
/// reads as `(A AND B) OR C`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub columns: Option<Vec<String>>,
    pub from: Option<TableReference>,
    pub joins: Vec<JoinClause>,
    pub expressions: Vec<String>,
    pub and_conditions: Vec<String>,
    pub or_conditions: Vec<String>,
    pub group_by: Vec<String>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Limit>,
}

impl Select {
    /// Base table followed by joined tables, in join order.
    pub fn tables(&self) -> Vec<TableReference> {
        self.from
            .iter()
            .cloned()
            .chain(self.joins.iter().map(|j| j.reference.clone()))
            .collect()
    }

    pub fn has_filter(&self) -> bool {
        !(self.expressions.is_empty()
            && self.and_conditions.is_empty()
            && self.or_conditions.is_empty())
    }
}
