use crate::error::OrmError;
use mapping::field::FieldDef;
use model::{
    core::{
        naming::{lower_first, to_snake_case},
        value::{Value, ValueError},
    },
    records::row::Row,
};

/// A persisted record type with named public fields.
///
/// Implementations are normally generated with [`entity!`](crate::entity),
/// which provides the field table and the name-based accessors.
pub trait Entity: Default {
    /// Class name, e.g. `Order`.
    const NAME: &'static str;

    const TABLE: &'static str;

    /// Declared public fields in declaration order.
    const FIELDS: &'static [FieldDef];

    /// Primary-key field; `None` means `lowerFirst(NAME) + "Id"`.
    const PRIMARY_KEY: Option<&'static str> = None;

    /// Stamped on creation when present and blank.
    const CREATED_FIELD: &'static str = "createdAt";

    /// Stamped on update when present and not given explicitly.
    const UPDATED_FIELD: &'static str = "updatedAt";

    /// Field holding the active flag.
    const STATUS_FIELD: &'static str = "status";
    const STATUS_ACTIVE: &'static str = "S";
    const STATUS_INACTIVE: &'static str = "N";

    /// Lives in the core database in multi mode.
    const CORE: bool = false;

    fn get_field(&self, name: &str) -> Option<Value>;

    /// Assigns `value` to the field `name`. Returns `false` when the entity
    /// has no such field.
    fn set_field(&mut self, name: &str, value: Value) -> Result<bool, ValueError>;

    /// Runs after construction, before any hydration.
    fn bootstrap(&mut self) {}

    fn primary_key() -> String {
        Self::PRIMARY_KEY
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}Id", lower_first(Self::NAME)))
    }

    fn primary_column() -> String {
        let key = Self::primary_key();
        Self::FIELDS
            .iter()
            .find(|f| f.name == key)
            .and_then(|f| f.column)
            .map_or_else(|| to_snake_case(&key), to_snake_case)
    }

    fn has_field(name: &str) -> bool {
        Self::FIELDS.iter().any(|f| f.name == name)
    }

    fn field_names() -> Vec<&'static str> {
        Self::FIELDS.iter().map(|f| f.name).collect()
    }

    fn id(&self) -> Value {
        self.get_field(&Self::primary_key()).unwrap_or(Value::Null)
    }

    fn set_id(&mut self, id: Value) -> Result<bool, ValueError> {
        self.set_field(&Self::primary_key(), id)
    }

    /// The requested fields, or every declared field when `fields` is empty.
    fn to_record(&self, fields: &[&str]) -> Result<Row, OrmError> {
        let names: Vec<&str> = if fields.is_empty() {
            Self::field_names()
        } else {
            fields.to_vec()
        };

        names
            .into_iter()
            .map(|name| {
                self.get_field(name)
                    .map(|value| (name, value))
                    .ok_or_else(|| OrmError::internal(format!("{} has no field `{name}`", Self::NAME)))
            })
            .collect()
    }
}
