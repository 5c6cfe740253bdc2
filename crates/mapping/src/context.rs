use crate::{
    cache::{EntityInfo, FieldColumnCache},
    registry::{EntityRegistry, MetadataSource},
};
use model::core::{identifiers::ClassId, naming::to_identifier_case};
use std::sync::Arc;

/// Application-level mapping state shared by query builders and mappers:
/// the entity namespace and the field/column cache.
#[derive(Debug)]
pub struct MappingContext {
    namespace: String,
    cache: FieldColumnCache,
}

impl MappingContext {
    pub fn new(registry: EntityRegistry) -> Self {
        let namespace = registry.namespace().to_string();
        Self::with_source(namespace, Arc::new(registry))
    }

    pub fn with_source(namespace: impl Into<String>, source: Arc<dyn MetadataSource>) -> Self {
        MappingContext {
            namespace: namespace.into(),
            cache: FieldColumnCache::new(source),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn cache(&self) -> &FieldColumnCache {
        &self.cache
    }

    /// Class bound to a table by naming convention: `order_line` in the
    /// `models` namespace is `models::OrderLine`.
    pub fn class_for_table(&self, table: &str) -> ClassId {
        ClassId::qualified(&self.namespace, &to_identifier_case(table))
    }

    pub fn class_for_name(&self, class_name: &str) -> ClassId {
        ClassId::qualified(&self.namespace, class_name)
    }

    pub fn info(&self, class: &ClassId) -> Arc<EntityInfo> {
        self.cache.get_info_for_class(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDef;

    #[test]
    fn test_table_to_class_convention() {
        let ctx = MappingContext::new(EntityRegistry::new("models"));
        assert_eq!(ctx.class_for_table("order").as_str(), "models::Order");
        assert_eq!(
            ctx.class_for_table("order_line").as_str(),
            "models::OrderLine"
        );
    }

    #[test]
    fn test_info_through_context() {
        let mut registry = EntityRegistry::new("app");
        registry
            .register("Customer", &[FieldDef::new("customerId")])
            .unwrap();
        let ctx = MappingContext::new(registry);

        let info = ctx.info(&ctx.class_for_table("customer"));
        assert!(info.is_declared("customerId"));
        assert!(ctx.cache().len() == 1);
    }
}
