pub mod select;
pub mod statement;
