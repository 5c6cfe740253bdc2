use crate::{
    ast::{
        common::{JoinClause, OrderBy, TableReference},
        select::Select,
    },
    render::{Render, Renderer},
};
use model::core::naming::to_snake_case;

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT
        r.sql.push_str("SELECT ");
        match &self.columns {
            Some(columns) => r.sql.push_str(&columns.join(", ")),
            None => {
                let wildcards: Vec<String> = self
                    .tables()
                    .iter()
                    .map(|t| format!("{}.*", t.alias))
                    .collect();
                r.sql.push_str(&wildcards.join(", "));
            }
        }

        // 2. FROM + JOIN
        if let Some(from) = &self.from {
            r.sql.push_str(" FROM ");
            from.render(r);
        }
        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        // 3. WHERE
        if self.has_filter() {
            let mut clause = self
                .expressions
                .iter()
                .map(|e| format!("({e})"))
                .chain(self.and_conditions.iter().cloned())
                .collect::<Vec<_>>()
                .join(" AND ");
            for condition in &self.or_conditions {
                if !clause.is_empty() {
                    clause.push_str(" OR ");
                }
                clause.push_str(condition);
            }
            r.sql.push_str(" WHERE ");
            r.sql.push_str(&clause);
        }

        // 4. GROUP BY
        if !self.group_by.is_empty() {
            r.sql.push_str(" GROUP BY ");
            r.sql.push_str(&self.group_by.join(", "));
        }

        // 5. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            r.push_list(&self.order_by, |r, order| order.render(r));
        }

        // 6. LIMIT / OFFSET
        if let Some(limit) = &self.limit {
            r.sql
                .push_str(&format!(" LIMIT {} OFFSET {}", limit.limit, limit.offset));
        }
    }
}

impl Render for TableReference {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&to_snake_case(&self.table));
        r.sql.push_str(" AS ");
        r.sql.push_str(&self.alias);
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(self.kind.as_sql());
        r.sql.push(' ');
        self.reference.render(r);
        r.sql.push_str(" ON ");
        r.sql.push_str(&self.condition);
    }
}

impl Render for OrderBy {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&format!("{} {}", self.field, self.direction));
    }
}
