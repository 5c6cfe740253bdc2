use crate::{
    ast::statement::{Insert, Update},
    render::{Render, Renderer},
};

impl Render for Insert {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("INSERT INTO ");
        r.sql.push_str(&self.table);
        r.sql.push_str(" (");
        r.sql.push_str(&self.columns.join(", "));
        r.sql.push_str(") VALUES (");
        r.push_list(&self.values, |r, value| r.add_param(value.clone()));
        r.sql.push(')');
    }
}

impl Render for Update {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("UPDATE ");
        r.sql.push_str(&self.table);
        r.sql.push_str(" SET ");
        r.push_list(&self.assignments, |r, (column, value)| {
            r.sql.push_str(column);
            r.sql.push_str(" = ");
            r.add_param(value.clone());
        });

        if !self.conditions.is_empty() {
            r.sql.push_str(" WHERE ");
            for (i, (column, value)) in self.conditions.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(" AND ");
                }
                r.sql.push_str(column);
                r.sql.push_str(" = ");
                r.add_param(value.clone());
            }
        }
    }
}
