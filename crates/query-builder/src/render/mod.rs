//! Turns resolved query fragments and statements into SQL text.

use model::{core::value::Value, records::params::Params};

pub mod select;
pub mod statement;

pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Accumulates the SQL text and the named parameters bound while rendering.
#[derive(Debug, Default)]
pub struct Renderer {
    pub sql: String,
    pub params: Params,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> (String, Params) {
        (self.sql, self.params)
    }

    /// Binds `value` as the next `:paramN` and writes the placeholder.
    pub fn add_param(&mut self, value: Value) {
        let placeholder = self.params.push(value);
        self.sql.push_str(&placeholder);
    }

    pub fn push_list<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            each(self, item);
        }
    }
}
