//! Pluggable field validators.
//!
//! A validator runs after the required-field check and returns an error
//! message, or `None` when the value is acceptable. Null values pass every
//! validator here; requiredness is the binding's job.

use regex::Regex;
use tabula_core::Value;

/// Message shown when a required field is empty.
pub const REQUIRED_MESSAGE: &str = "Value is empty; this field does not allow empty values";

pub trait FieldValidator: Send + Sync {
    fn validate(&self, value: &Value) -> Option<String>;
}

impl<F> FieldValidator for F
where
    F: Fn(&Value) -> Option<String> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Option<String> {
        self(value)
    }
}

/// Character count bounds for text, element count bounds for lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl LengthValidator {
    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_most(max: usize) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }
}

impl FieldValidator for LengthValidator {
    fn validate(&self, value: &Value) -> Option<String> {
        let len = match value {
            Value::Text(s) => s.chars().count(),
            Value::List(items) => items.len(),
            _ => return None,
        };
        if let Some(min) = self.min {
            if len < min {
                return Some(format!("Must be at least {} long", min));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return Some(format!("Must be at most {} long", max));
            }
        }
        None
    }
}

/// Inclusive numeric bounds for int and float values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeValidator {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

impl FieldValidator for RangeValidator {
    fn validate(&self, value: &Value) -> Option<String> {
        let n = match value {
            Value::Int(v) => *v as f64,
            Value::Float(v) => *v,
            _ => return None,
        };
        match (self.min, self.max) {
            (Some(min), _) if n < min => Some(format!("Must be at least {}", min)),
            (_, Some(max)) if n > max => Some(format!("Must be at most {}", max)),
            _ => None,
        }
    }
}

/// Whole-value regular expression match on text.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    pattern: Regex,
    message: String,
}

impl PatternValidator {
    /// Compile `pattern`, anchored at both ends.
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
            message: message.into(),
        })
    }
}

impl FieldValidator for PatternValidator {
    fn validate(&self, value: &Value) -> Option<String> {
        match value {
            Value::Text(s) if !s.is_empty() && !self.pattern.is_match(s) => {
                Some(self.message.clone())
            }
            _ => None,
        }
    }
}
