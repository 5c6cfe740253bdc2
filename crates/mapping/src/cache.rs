use crate::{field::FieldColumnEntry, registry::MetadataSource};
use model::core::{
    identifiers::ClassId,
    naming::{column_to_field, to_snake_case},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, trace};

/// Field/column knowledge about one class: its declared public fields and the
/// explicit overrides among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    pub class: ClassId,
    pub declared: Vec<String>,
    pub entries: Vec<FieldColumnEntry>,
}

impl EntityInfo {
    /// Override column for `field`, if one was declared.
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.column.as_str())
    }

    /// Field owning the override `column`. First match wins.
    pub fn field_for(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.column == column)
            .map(|e| e.field.as_str())
    }

    pub fn is_declared(&self, field: &str) -> bool {
        self.declared.iter().any(|f| f == field)
    }

    /// Storage column for a field: the override, or its snake-case form.
    pub fn column_of(&self, field: &str) -> String {
        self.column_for(field)
            .map_or_else(|| to_snake_case(field), str::to_string)
    }

    /// Field for a storage column: the override owner, or the identifier-case
    /// form of the column.
    pub fn field_of(&self, column: &str) -> String {
        self.field_for(column)
            .map_or_else(|| column_to_field(column), str::to_string)
    }

    /// Rewrites an `alias.token` token. Declared fields map to their column;
    /// anything else is taken to be a column already and kept as is.
    pub fn resolve_token(&self, token: &str) -> String {
        if self.is_declared(token) {
            self.column_of(token)
        } else {
            token.to_string()
        }
    }
}

/// Per-class field/column metadata, computed on first access and kept for
/// the life of the cache.
///
/// Computation happens under the cache lock, so concurrent first lookups of
/// one class still hit the metadata source once.
pub struct FieldColumnCache {
    source: Arc<dyn MetadataSource>,
    classes: Mutex<HashMap<ClassId, Arc<EntityInfo>>>,
}

impl FieldColumnCache {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        FieldColumnCache {
            source,
            classes: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_info_for_class(&self, class: &ClassId) -> Arc<EntityInfo> {
        // A panic while computing leaves no partial entry behind, so a
        // poisoned map is still consistent.
        let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = classes.get(class) {
            return Arc::clone(info);
        }

        let info = Arc::new(self.compute(class));
        classes.insert(class.clone(), Arc::clone(&info));
        info
    }

    pub fn len(&self) -> usize {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compute(&self, class: &ClassId) -> EntityInfo {
        let declared: Vec<String> = self
            .source
            .declared_fields(class)
            .into_iter()
            .filter(|f| self.source.is_public_instance_field(class, f))
            .collect();

        let entries: Vec<FieldColumnEntry> = declared
            .iter()
            .filter_map(|field| {
                let column = self.source.declared_column_name(class, field)?;
                trace!(class = %class, field = %field, column = %column, "Column override");
                Some(FieldColumnEntry::new(field, to_snake_case(&column)))
            })
            .collect();

        debug!(
            class = %class,
            fields = declared.len(),
            overrides = entries.len(),
            "Computed field/column entries"
        );

        EntityInfo {
            class: class.clone(),
            declared,
            entries,
        }
    }
}

impl std::fmt::Debug for FieldColumnCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldColumnCache")
            .field("classes", &self.len())
            .finish()
    }
}
