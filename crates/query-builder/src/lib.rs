pub mod ast;
pub mod build;
pub mod error;
pub mod placeholders;
pub mod render;
pub mod resolve;

pub use build::{
    select::{QueryBuilder, Selection},
    statement::{InsertBuilder, UpdateBuilder},
};
pub use error::BuildError;
pub use placeholders::expand_placeholders;
pub use resolve::resolve_tokens;
