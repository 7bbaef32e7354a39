//! Error types for TABULA operations

use thiserror::Error;

/// Predicate fragment errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Filter fragment '{key}' failed to build: {reason}")]
    FragmentFailed { key: String, reason: String },

    #[error("Unknown field '{field}' on {entity_type}")]
    UnknownField { entity_type: String, field: String },

    #[error("Invalid filter value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Declarative metadata errors. Never fatal: callers fall back to zero values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Default value '{raw}' for {entity_type}.{field} is not a valid {kind}")]
    UnresolvableDefault {
        entity_type: String,
        field: String,
        raw: String,
        kind: String,
    },

    #[error("Duplicate field '{field}' registered on {entity_type}")]
    DuplicateField { entity_type: String, field: String },
}

/// A model does not expose a field its schema declares.
///
/// This is a construction-time misconfiguration, not a user condition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReflectionAccessError {
    #[error("Field '{field}' is not readable on {entity_type}")]
    NotReadable { entity_type: String, field: String },

    #[error("Field '{field}' is not writable on {entity_type}")]
    NotWritable { entity_type: String, field: String },

    #[error("Field '{field}' on {entity_type} rejected value of kind {got}")]
    KindMismatch {
        entity_type: String,
        field: String,
        got: String,
    },
}

/// Store layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Count failed for {entity_type}: {reason}")]
    CountFailed { entity_type: String, reason: String },

    #[error("Page fetch failed for {entity_type} (page {page_index}, size {page_size}): {reason}")]
    PageFailed {
        entity_type: String,
        page_index: u64,
        page_size: u64,
        reason: String,
    },

    #[error("Save failed for {entity_type}: {reason}")]
    SaveFailed { entity_type: String, reason: String },

    #[error("Invalid page window: {reason}")]
    InvalidWindow { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Field-level validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Form rejected by save hook")]
    Vetoed,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all TABULA errors.
#[derive(Debug, Clone, Error)]
pub enum TabulaError {
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Reflection error: {0}")]
    Reflection(#[from] ReflectionAccessError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl TabulaError {
    /// Message suitable for showing to the person using the screen.
    ///
    /// Internal details (entity type names, raw reasons) stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            TabulaError::Filter(_) => "The current filter could not be applied.".to_string(),
            TabulaError::Metadata(_) | TabulaError::Reflection(_) | TabulaError::Config(_) => {
                "This screen is misconfigured.".to_string()
            }
            TabulaError::Store(StoreError::SaveFailed { .. }) => {
                "Saving failed. Please try again.".to_string()
            }
            TabulaError::Store(_) => "Loading data failed. Please try again.".to_string(),
            TabulaError::Validation(ValidationError::Vetoed) => {
                "The form was not accepted.".to_string()
            }
            TabulaError::Validation(_) => "Please correct the highlighted fields.".to_string(),
        }
    }
}

/// Result type alias for TABULA operations.
pub type TabulaResult<T> = Result<T, TabulaError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_display_fragment_failed() {
        let err = FilterError::FragmentFailed {
            key: "status".to_string(),
            reason: "bad enum".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("status"));
        assert!(msg.contains("bad enum"));
    }

    #[test]
    fn test_metadata_error_display_unresolvable_default() {
        let err = MetadataError::UnresolvableDefault {
            entity_type: "Echo".to_string(),
            field: "count".to_string(),
            raw: "many".to_string(),
            kind: "Int".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Echo.count"));
        assert!(msg.contains("many"));
    }

    #[test]
    fn test_store_error_display_page_failed() {
        let err = StoreError::PageFailed {
            entity_type: "Echo".to_string(),
            page_index: 2,
            page_size: 10,
            reason: "timeout".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 2"));
        assert!(msg.contains("size 10"));
        assert!(msg.contains("timeout"));
    }

    #[test]
    fn test_store_error_display_lock_poisoned() {
        let msg = format!("{}", StoreError::LockPoisoned);
        assert!(msg.contains("lock poisoned"));
    }

    #[test]
    fn test_tabula_error_from_variants() {
        let store = TabulaError::from(StoreError::LockPoisoned);
        assert!(matches!(store, TabulaError::Store(_)));

        let validation = TabulaError::from(ValidationError::RequiredFieldMissing {
            field: "name".to_string(),
        });
        assert!(matches!(validation, TabulaError::Validation(_)));

        let reflection = TabulaError::from(ReflectionAccessError::NotWritable {
            entity_type: "Echo".to_string(),
            field: "ghost".to_string(),
        });
        assert!(matches!(reflection, TabulaError::Reflection(_)));
    }

    #[test]
    fn test_user_message_hides_internal_reason() {
        let err = TabulaError::from(StoreError::CountFailed {
            entity_type: "Echo".to_string(),
            reason: "connection reset by peer".to_string(),
        });
        let msg = err.user_message();
        assert!(!msg.contains("connection reset"));
        assert!(!msg.contains("Echo"));
    }
}
