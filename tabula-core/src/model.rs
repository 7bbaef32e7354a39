//! Model and entity contracts.
//!
//! A model exposes its fields by name through [`Record::get`] and
//! [`Model::set`] and registers its schema once through [`Model::schema`].
//! Entities are models the store owns and can key by [`Identity`].

use crate::error::ReflectionAccessError;
use crate::field::ModelSchema;
use crate::identity::Identity;
use crate::value::Value;

/// Read-only field access. Predicates and visibility conditions evaluate
/// against this.
pub trait Record {
    /// Current value of `field`, or `None` when the record has no such field.
    fn get(&self, field: &str) -> Option<Value>;
}

/// A form-bindable data type with a statically registered schema.
pub trait Model: Record + 'static {
    /// Field declarations for this type. Called once per type; the result is
    /// cached by the metadata index.
    fn schema() -> ModelSchema
    where
        Self: Sized;

    /// Write `value` into `field`.
    fn set(&mut self, field: &str, value: Value) -> Result<(), ReflectionAccessError>;
}

/// A model owned by a store and keyed by a stable identity.
pub trait Entity: Model + Clone + Send + Sync {
    /// `None` until the entity has been saved.
    fn identity(&self) -> Option<Identity>;

    /// Set the identity assigned by the store.
    fn assign_identity(&mut self, identity: Identity);
}

/// Build the error a `set` implementation returns for a field it does not
/// know.
pub fn not_writable(entity_type: &str, field: &str) -> ReflectionAccessError {
    ReflectionAccessError::NotWritable {
        entity_type: entity_type.to_string(),
        field: field.to_string(),
    }
}

/// Build the error a `set` implementation returns for a value of the wrong
/// kind.
pub fn kind_mismatch(entity_type: &str, field: &str, value: &Value) -> ReflectionAccessError {
    ReflectionAccessError::KindMismatch {
        entity_type: entity_type.to_string(),
        field: field.to_string(),
        got: value.kind_name().to_string(),
    }
}

impl Record for std::collections::BTreeMap<String, Value> {
    fn get(&self, field: &str) -> Option<Value> {
        std::collections::BTreeMap::get(self, field).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_map_record_reads_fields() {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::text("red"));
        assert_eq!(Record::get(&map, "name"), Some(Value::text("red")));
        assert_eq!(Record::get(&map, "missing"), None);
    }

    #[test]
    fn test_error_helpers() {
        let err = not_writable("Echo", "ghost");
        assert!(matches!(err, ReflectionAccessError::NotWritable { .. }));
        let err = kind_mismatch("Echo", "count", &Value::text("x"));
        assert!(format!("{}", err).contains("Text"));
    }
}
