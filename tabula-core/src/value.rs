//! Dynamic field values and declared field kinds.
//!
//! Every model field is read and written as a [`Value`]; its declared type is a
//! [`FieldKind`]. Kinds know their zero value and how to parse declarative
//! default text, values know how to compare, coerce to text for search, and
//! format for grid display.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Placeholder rendered for null cells.
pub const NULL_DISPLAY: &str = "-";

/// A single enum constant with an optional human description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    pub description: Option<String>,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Choice label: `NAME - description`, or just `NAME`.
    pub fn label(&self) -> String {
        match &self.description {
            Some(desc) if !desc.is_empty() => format!("{} - {}", self.name, desc),
            _ => self.name.clone(),
        }
    }
}

/// Declared type of a model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Text,
    Date,
    Timestamp,
    Uuid,
    Enum { variants: Vec<EnumVariant> },
    List(Box<FieldKind>),
    /// Marker for fields that cannot be shown in a grid or edited generically.
    Unsupported,
}

impl FieldKind {
    /// Convenience constructor for enum kinds without descriptions.
    pub fn enumeration<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldKind::Enum {
            variants: names.into_iter().map(EnumVariant::new).collect(),
        }
    }

    pub fn list_of(inner: FieldKind) -> Self {
        FieldKind::List(Box::new(inner))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "Bool",
            FieldKind::Int => "Int",
            FieldKind::Float => "Float",
            FieldKind::Text => "Text",
            FieldKind::Date => "Date",
            FieldKind::Timestamp => "Timestamp",
            FieldKind::Uuid => "Uuid",
            FieldKind::Enum { .. } => "Enum",
            FieldKind::List(_) => "List",
            FieldKind::Unsupported => "Unsupported",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FieldKind::Text)
    }

    pub fn is_displayable(&self) -> bool {
        !matches!(self, FieldKind::Unsupported)
    }

    /// Type-safe zero value used when neither the model nor the declaration
    /// supplies one.
    pub fn zero_value(&self) -> Value {
        match self {
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Int => Value::Int(0),
            FieldKind::Float => Value::Float(0.0),
            FieldKind::Text => Value::Text(String::new()),
            FieldKind::List(_) => Value::List(Vec::new()),
            FieldKind::Date
            | FieldKind::Timestamp
            | FieldKind::Uuid
            | FieldKind::Enum { .. }
            | FieldKind::Unsupported => Value::Null,
        }
    }

    /// Parse declarative default text into a value of this kind.
    pub fn parse(&self, raw: &str) -> Result<Value, String> {
        let trimmed = raw.trim();
        match self {
            FieldKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                other => Err(format!("'{}' is not a boolean", other)),
            },
            FieldKind::Int => trimmed
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| e.to_string()),
            FieldKind::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| e.to_string()),
            FieldKind::Text => Ok(Value::Text(raw.to_string())),
            FieldKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| e.to_string()),
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(trimmed)
                .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|e| e.to_string()),
            FieldKind::Uuid => Uuid::parse_str(trimmed)
                .map(Value::Uuid)
                .map_err(|e| e.to_string()),
            FieldKind::Enum { variants } => variants
                .iter()
                .find(|v| v.name == trimmed)
                .map(|v| Value::Enum(v.name.clone()))
                .ok_or_else(|| format!("'{}' is not a known variant", trimmed)),
            FieldKind::List(inner) => {
                if trimmed.is_empty() {
                    return Ok(Value::List(Vec::new()));
                }
                trimmed
                    .split(',')
                    .map(|part| inner.parse(part))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            FieldKind::Unsupported => Err("field kind cannot hold declared defaults".to_string()),
        }
    }

    /// Enum variants when this is an enum kind.
    pub fn variants(&self) -> &[EnumVariant] {
        match self {
            FieldKind::Enum { variants } => variants,
            _ => &[],
        }
    }
}

/// Dynamic field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Enum(String),
    List(Vec<Value>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, blank text and empty lists count as empty for required-field
    /// checks.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
            Value::Date(_) => "Date",
            Value::Timestamp(_) => "Timestamp",
            Value::Uuid(_) => "Uuid",
            Value::Enum(_) => "Enum",
            Value::List(_) => "List",
        }
    }

    /// Whether this value may be stored in a field of `kind`. Null fits every
    /// kind.
    pub fn conforms_to(&self, kind: &FieldKind) -> bool {
        match (self, kind) {
            (Value::Null, _) => true,
            (Value::Bool(_), FieldKind::Bool)
            | (Value::Int(_), FieldKind::Int)
            | (Value::Float(_), FieldKind::Float)
            | (Value::Text(_), FieldKind::Text)
            | (Value::Date(_), FieldKind::Date)
            | (Value::Timestamp(_), FieldKind::Timestamp)
            | (Value::Uuid(_), FieldKind::Uuid) => true,
            (Value::Enum(name), FieldKind::Enum { variants }) => {
                variants.iter().any(|v| &v.name == name)
            }
            (Value::List(items), FieldKind::List(inner)) => {
                items.iter().all(|item| item.conforms_to(inner))
            }
            _ => false,
        }
    }

    /// Text form used by substring search. Non-text values are coerced so a
    /// numeric or date column stays searchable.
    pub fn to_search_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Text(v) => v.clone(),
            Value::Date(v) => v.format("%Y-%m-%d").to_string(),
            Value::Timestamp(v) => v.to_rfc3339(),
            Value::Uuid(v) => v.to_string(),
            Value::Enum(v) => v.clone(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_search_text).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }

    /// Grid cell text: `-` for null, enum names, comma-joined lists, cut to
    /// `max_chars` characters.
    pub fn display_text(&self, max_chars: usize) -> String {
        let full = match self {
            Value::Null => return NULL_DISPLAY.to_string(),
            Value::List(items) if items.is_empty() => return NULL_DISPLAY.to_string(),
            Value::List(items) => items
                .iter()
                .map(|item| item.display_text(usize::MAX))
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_search_text(),
        };
        truncate_chars(&full, max_chars)
    }

    /// Total canonical ordering: variant rank first, then in-variant order.
    /// Floats use IEEE total ordering so sorting never panics.
    pub fn canonical_cmp(&self, other: &Value) -> Ordering {
        let rank = self.rank().cmp(&other.rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    let ord = left.canonical_cmp(right);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => Ordering::Equal,
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Text(_) => 4,
            Value::Date(_) => 5,
            Value::Timestamp(_) => 6,
            Value::Uuid(_) => 7,
            Value::Enum(_) => 8,
            Value::List(_) => 9,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Cut `text` to at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
