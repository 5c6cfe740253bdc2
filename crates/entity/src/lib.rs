pub mod core {
    pub mod entity;
    pub mod field_type;
}

pub mod error;
pub mod factory;
pub mod hydrate;
pub mod macros;
pub mod repository;

pub use crate::core::{entity::Entity, field_type::FieldType};
pub use error::OrmError;
pub use factory::{Repositories, RepositoriesBuilder};
pub use hydrate::{Collapse, Hydrated, Mapper, Materialize};
pub use repository::Repository;

pub use mapping::field::FieldDef;
pub use model::{
    core::value::{Value, ValueError},
    records::{params::Params, row::Row},
};
