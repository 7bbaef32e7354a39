//! Predicate expressions and sort orders.
//!
//! Predicates are plain data: stores may translate them into their own query
//! language or evaluate them in memory with [`Predicate::evaluate`].

use crate::model::Record;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Comparison operator for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Boolean filter over a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches everything.
    Always,
    /// Matches nothing.
    Never,
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    /// Case-insensitive substring match on the field's search text.
    TextContains { field: String, needle: String },
    /// Field value is one of the listed values.
    In { field: String, values: Vec<Value> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Substring match; the needle is lowercased here once.
    pub fn contains(field: impl Into<String>, needle: &str) -> Self {
        Predicate::TextContains {
            field: field.into(),
            needle: needle.to_lowercase(),
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Predicate::In {
            field: field.into(),
            values,
        }
    }

    /// Conjunction that collapses trivial cases: `Always` members are dropped,
    /// an empty list becomes `Always`, a single member is returned as is.
    pub fn and_all(parts: Vec<Predicate>) -> Self {
        let mut parts: Vec<Predicate> = parts
            .into_iter()
            .filter(|p| !matches!(p, Predicate::Always))
            .collect();
        match parts.len() {
            0 => Predicate::Always,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    /// Disjunction; an empty list becomes `Never`.
    pub fn or_any(mut parts: Vec<Predicate>) -> Self {
        match parts.len() {
            0 => Predicate::Never,
            1 => parts.remove(0),
            _ => Predicate::Or(parts),
        }
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// In-memory evaluation. Unknown fields read as null.
    pub fn evaluate(&self, record: &dyn Record) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::Compare { field, op, value } => {
                let actual = record.get(field).unwrap_or(Value::Null);
                op.holds(actual.canonical_cmp(value))
            }
            Predicate::TextContains { field, needle } => record
                .get(field)
                .filter(|v| !v.is_null())
                .map(|v| v.to_search_text().to_lowercase().contains(needle.as_str()))
                .unwrap_or(false),
            Predicate::In { field, values } => {
                let actual = record.get(field).unwrap_or(Value::Null);
                values
                    .iter()
                    .any(|v| actual.canonical_cmp(v) == Ordering::Equal)
            }
            Predicate::And(parts) => parts.iter().all(|p| p.evaluate(record)),
            Predicate::Or(parts) => parts.iter().any(|p| p.evaluate(record)),
            Predicate::Not(inner) => !inner.evaluate(record),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Compare two records by this key.
    pub fn compare(&self, a: &dyn Record, b: &dyn Record) -> Ordering {
        let left = a.get(&self.field).unwrap_or(Value::Null);
        let right = b.get(&self.field).unwrap_or(Value::Null);
        let ordering = left.canonical_cmp(&right);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Compare by each key in turn.
pub fn compare_by(orders: &[SortOrder], a: &dyn Record, b: &dyn Record) -> Ordering {
    orders
        .iter()
        .map(|o| o.compare(a, b))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
