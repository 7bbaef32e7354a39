//! Identity types for TABULA entities

use crate::value::{FieldKind, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable primary-key value distinguishing entities regardless of which page
/// they appear on.
///
/// Ordering is total: variant first (`Int < Uuid < Text`), then the inner
/// value, so identity sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Identity {
    Int(i64),
    Uuid(Uuid),
    Text(String),
}

impl Identity {
    /// Parse user-entered text as an identity of the given declared kind.
    ///
    /// Returns `None` when the text does not fit the kind; an id search with
    /// unparseable input simply contributes no constraint.
    pub fn parse(kind: &FieldKind, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match kind {
            FieldKind::Int => text.parse::<i64>().ok().map(Identity::Int),
            FieldKind::Uuid => Uuid::parse_str(text).ok().map(Identity::Uuid),
            FieldKind::Text | FieldKind::Enum { .. } => Some(Identity::Text(text.to_string())),
            _ => None,
        }
    }

    /// Lift a field value into an identity. Only integer, uuid and text values
    /// can act as keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(Identity::Int(*v)),
            Value::Uuid(v) => Some(Identity::Uuid(*v)),
            Value::Text(v) => Some(Identity::Text(v.clone())),
            _ => None,
        }
    }

    /// The identity as a plain field value, for building equality predicates.
    pub fn to_value(&self) -> Value {
        match self {
            Identity::Int(v) => Value::Int(*v),
            Identity::Uuid(v) => Value::Uuid(*v),
            Identity::Text(v) => Value::Text(v.clone()),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Int(v) => write!(f, "{}", v),
            Identity::Uuid(v) => write!(f, "{}", v),
            Identity::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Identity::Int(value)
    }
}

impl From<Uuid> for Identity {
    fn from(value: Uuid) -> Self {
        Identity::Uuid(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Identity::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_identity() {
        assert_eq!(Identity::parse(&FieldKind::Int, " 42 "), Some(Identity::Int(42)));
        assert_eq!(Identity::parse(&FieldKind::Int, "forty-two"), None);
        assert_eq!(Identity::parse(&FieldKind::Int, "   "), None);
    }

    #[test]
    fn test_parse_uuid_identity() {
        let id = Uuid::new_v4();
        assert_eq!(
            Identity::parse(&FieldKind::Uuid, &id.to_string()),
            Some(Identity::Uuid(id))
        );
        assert_eq!(Identity::parse(&FieldKind::Uuid, "not-a-uuid"), None);
    }

    #[test]
    fn test_parse_unsupported_kind_yields_none() {
        assert_eq!(Identity::parse(&FieldKind::Bool, "true"), None);
    }

    #[test]
    fn test_value_round_trip_keeps_variant() {
        let id = Identity::Text("abc".to_string());
        assert_eq!(Identity::from_value(&id.to_value()), Some(id));
        assert_eq!(Identity::from_value(&Value::Bool(true)), None);
    }

    #[test]
    fn test_ordering_is_deterministic_across_variants() {
        let mut ids = vec![
            Identity::Text("a".to_string()),
            Identity::Int(3),
            Identity::Int(1),
        ];
        ids.sort();
        assert_eq!(ids[0], Identity::Int(1));
        assert_eq!(ids[2], Identity::Text("a".to_string()));
    }
}
