use model::core::identifiers::ClassId;
use thiserror::Error;

/// Data-definition errors detected while entity classes are registered.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MappingError {
    #[error("class {class}: fields `{first}` and `{second}` both map to column `{column}`")]
    DuplicateColumn {
        class: ClassId,
        column: String,
        first: String,
        second: String,
    },

    #[error("class {0} is already registered")]
    DuplicateClass(ClassId),
}
