//! Field metadata index.
//!
//! Builds the ordered descriptor table for a model type from its registered
//! schema, once per type, and shares it through an `Arc`.

use crate::error::MetadataError;
use crate::field::{FieldDescriptor, FieldSpec, ModelSchema};
use crate::model::Model;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

static GLOBAL_INDEX: Lazy<FieldMetadataIndex> = Lazy::new(FieldMetadataIndex::new);

/// Descriptors for one model type, in display order.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub entity_type: String,
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    /// Resolve a schema into descriptors.
    ///
    /// Transient and unsupported fields are skipped. Malformed defaults are
    /// logged and dropped. Duplicate names keep the first declaration.
    pub fn from_schema(schema: ModelSchema) -> Self {
        let entity_type = schema.name;
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(schema.fields.len());

        for (index, spec) in schema.fields.into_iter().enumerate() {
            if spec.transient || !spec.kind.is_displayable() {
                continue;
            }
            if !seen.insert(spec.name.clone()) {
                let err = MetadataError::DuplicateField {
                    entity_type: entity_type.clone(),
                    field: spec.name.clone(),
                };
                tracing::warn!(error = %err, "Ignoring duplicate field declaration");
                continue;
            }
            fields.push(resolve_descriptor(&entity_type, spec, index));
        }

        fields.sort_by_key(FieldDescriptor::sort_key);

        Self {
            entity_type,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn identity_field(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_identity)
    }

    pub fn searchable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.searchable)
    }

    pub fn sortable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.sortable)
    }

    pub fn editable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.editable)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

fn resolve_descriptor(entity_type: &str, spec: FieldSpec, index: usize) -> FieldDescriptor {
    let default_value = spec.default_text.as_ref().and_then(|raw| {
        match spec.kind.parse(raw) {
            Ok(value) => Some(value),
            Err(reason) => {
                let err = MetadataError::UnresolvableDefault {
                    entity_type: entity_type.to_string(),
                    field: spec.name.clone(),
                    raw: raw.clone(),
                    kind: spec.kind.name().to_string(),
                };
                tracing::warn!(error = %err, reason = %reason, "Dropping malformed default");
                None
            }
        }
    });

    FieldDescriptor {
        display_name: spec.title.unwrap_or_else(|| spec.name.clone()),
        name: spec.name,
        description: spec.description,
        order: spec.order,
        editable: spec.editable,
        searchable: spec.searchable,
        sortable: spec.sortable,
        frozen: spec.frozen,
        is_identity: spec.identity,
        nullable: spec.nullable,
        kind: spec.kind,
        default_value,
        conditions: spec.conditions,
        declaration_index: index,
    }
}

/// Per-type cache of [`ModelDescriptor`]s.
#[derive(Debug, Default)]
pub struct FieldMetadataIndex {
    cache: RwLock<HashMap<TypeId, Arc<ModelDescriptor>>>,
}

impl FieldMetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide index.
    pub fn global() -> &'static FieldMetadataIndex {
        &GLOBAL_INDEX
    }

    /// Descriptors for `M`, built on first use.
    pub fn describe<M: Model>(&self) -> Arc<ModelDescriptor> {
        let key = TypeId::of::<M>();
        if let Ok(cache) = self.cache.read() {
            if let Some(found) = cache.get(&key) {
                return Arc::clone(found);
            }
        }

        let built = Arc::new(ModelDescriptor::from_schema(M::schema()));
        tracing::debug!(
            entity_type = %built.entity_type,
            fields = built.fields.len(),
            "Built field metadata"
        );

        match self.cache.write() {
            Ok(mut cache) => Arc::clone(cache.entry(key).or_insert(built)),
            // A poisoned cache only loses memoization.
            Err(_) => built,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
