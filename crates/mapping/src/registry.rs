use crate::{error::MappingError, field::FieldDef};
use model::core::{identifiers::ClassId, naming::to_snake_case};
use std::collections::HashMap;
use tracing::debug;

/// Class metadata lookups used to build the field/column cache.
///
/// `declared_fields` and `is_public_instance_field` describe the shape of a
/// class; `declared_column_name` returns the column override declared on a
/// field, if any. Implementations must return stable answers for the life of
/// the process.
pub trait MetadataSource: Send + Sync {
    fn declared_fields(&self, class: &ClassId) -> Vec<String>;

    fn is_public_instance_field(&self, class: &ClassId, field: &str) -> bool;

    fn declared_column_name(&self, class: &ClassId, field: &str) -> Option<String>;
}

#[derive(Debug, Clone)]
struct RegisteredClass {
    fields: Vec<FieldDef>,
}

/// Static table of entity classes and their declared fields, populated once
/// at startup.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    namespace: String,
    classes: HashMap<ClassId, RegisteredClass>,
}

impl EntityRegistry {
    pub fn new(namespace: impl Into<String>) -> Self {
        EntityRegistry {
            namespace: namespace.into(),
            classes: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn class_id(&self, class_name: &str) -> ClassId {
        ClassId::qualified(&self.namespace, class_name)
    }

    /// Registers `class_name` with its declared fields.
    ///
    /// Two fields resolving to the same column (whether through an override
    /// or through snake case) are rejected, as is registering a class twice.
    pub fn register(
        &mut self,
        class_name: &str,
        fields: &[FieldDef],
    ) -> Result<ClassId, MappingError> {
        let class = self.class_id(class_name);
        if self.classes.contains_key(&class) {
            return Err(MappingError::DuplicateClass(class));
        }

        let mut seen: HashMap<String, &'static str> = HashMap::new();
        for field in fields {
            let column = to_snake_case(field.column.unwrap_or(field.name));
            if let Some(first) = seen.insert(column.clone(), field.name) {
                return Err(MappingError::DuplicateColumn {
                    class,
                    column,
                    first: first.to_string(),
                    second: field.name.to_string(),
                });
            }
        }

        debug!(class = %class, fields = fields.len(), "Registered entity class");
        self.classes.insert(
            class.clone(),
            RegisteredClass {
                fields: fields.to_vec(),
            },
        );
        Ok(class)
    }

    pub fn contains(&self, class: &ClassId) -> bool {
        self.classes.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn field(&self, class: &ClassId, field: &str) -> Option<&FieldDef> {
        self.classes
            .get(class)
            .and_then(|c| c.fields.iter().find(|f| f.name == field))
    }
}

impl MetadataSource for EntityRegistry {
    fn declared_fields(&self, class: &ClassId) -> Vec<String> {
        self.classes
            .get(class)
            .map(|c| c.fields.iter().map(|f| f.name.to_string()).collect())
            .unwrap_or_default()
    }

    // Only public instance fields are ever registered.
    fn is_public_instance_field(&self, class: &ClassId, field: &str) -> bool {
        self.field(class, field).is_some()
    }

    fn declared_column_name(&self, class: &ClassId, field: &str) -> Option<String> {
        self.field(class, field)
            .and_then(|f| f.column)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: &[FieldDef] = &[
        FieldDef::new("orderId"),
        FieldDef::new("customerId"),
        FieldDef::with_column("total", "total_amount"),
    ];

    #[test]
    fn test_register_and_lookup() {
        let mut registry = EntityRegistry::new("models");
        let class = registry.register("Order", ORDER).unwrap();

        assert_eq!(class.as_str(), "models::Order");
        assert_eq!(
            registry.declared_fields(&class),
            vec!["orderId", "customerId", "total"]
        );
        assert!(registry.is_public_instance_field(&class, "customerId"));
        assert!(!registry.is_public_instance_field(&class, "customer_id"));
        assert_eq!(
            registry.declared_column_name(&class, "total").as_deref(),
            Some("total_amount")
        );
        assert_eq!(registry.declared_column_name(&class, "orderId"), None);
    }

    #[test]
    fn test_unregistered_class_has_no_fields() {
        let registry = EntityRegistry::new("models");
        let class = registry.class_id("Ghost");
        assert!(registry.declared_fields(&class).is_empty());
        assert!(!registry.is_public_instance_field(&class, "id"));
    }

    #[test]
    fn test_duplicate_override_is_rejected() {
        let mut registry = EntityRegistry::new("models");
        let err = registry
            .register(
                "Invoice",
                &[
                    FieldDef::with_column("net", "amount"),
                    FieldDef::with_column("gross", "amount"),
                ],
            )
            .unwrap_err();

        assert_eq!(
            err,
            MappingError::DuplicateColumn {
                class: ClassId::new("models::Invoice"),
                column: "amount".into(),
                first: "net".into(),
                second: "gross".into(),
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_override_colliding_with_default_column_is_rejected() {
        let mut registry = EntityRegistry::new("models");
        let result = registry.register(
            "Invoice",
            &[
                FieldDef::new("customerId"),
                FieldDef::with_column("client", "customer_id"),
            ],
        );
        assert!(matches!(result, Err(MappingError::DuplicateColumn { .. })));
    }

    #[test]
    fn test_duplicate_class_is_rejected() {
        let mut registry = EntityRegistry::new("models");
        registry.register("Order", ORDER).unwrap();
        assert!(matches!(
            registry.register("Order", ORDER),
            Err(MappingError::DuplicateClass(_))
        ));
    }
}
