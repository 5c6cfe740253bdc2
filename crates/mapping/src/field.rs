/// A declared public field of an entity type, with its optional column
/// override. Fields without an override map through snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: Option<&'static str>,
}

impl FieldDef {
    pub const fn new(name: &'static str) -> Self {
        FieldDef { name, column: None }
    }

    pub const fn with_column(name: &'static str, column: &'static str) -> Self {
        FieldDef {
            name,
            column: Some(column),
        }
    }
}

/// An explicit field to column override, as held by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldColumnEntry {
    pub field: String,
    pub column: String,
}

impl FieldColumnEntry {
    pub fn new(field: impl Into<String>, column: impl Into<String>) -> Self {
        FieldColumnEntry {
            field: field.into(),
            column: column.into(),
        }
    }
}
