pub mod cache;
pub mod context;
pub mod error;
pub mod field;
pub mod registry;
