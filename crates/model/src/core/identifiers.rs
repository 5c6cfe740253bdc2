use std::{fmt, sync::Arc};

/// Identity of an entity class: the namespace-qualified class name,
/// e.g. `models::Order`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(Arc<str>);

impl ClassId {
    pub const SEPARATOR: &'static str = "::";

    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    /// Builds `namespace::name`; an empty namespace yields the bare name.
    pub fn qualified(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            Self::new(name)
        } else {
            Self::new(format!("{namespace}{}{name}", Self::SEPARATOR))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClassId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_class_id() {
        let id = ClassId::qualified("models", "Order");
        assert_eq!(id.as_str(), "models::Order");
        assert_eq!(ClassId::qualified("", "Order").as_str(), "Order");
    }
}
