//! Error types for form binding.

use tabula_core::{ReflectionAccessError, StoreError, TabulaError, ValidationError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Reflection(#[from] ReflectionAccessError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Form has no field named '{field}'")]
    UnknownField { field: String },
    #[error("Field '{field}' is read-only")]
    ReadOnlyField { field: String },
}

impl FormError {
    /// Message for the person filling in the form.
    pub fn user_message(&self) -> String {
        TabulaError::from(self.clone()).user_message()
    }
}

impl From<FormError> for TabulaError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Reflection(e) => TabulaError::Reflection(e),
            FormError::Validation(e) => TabulaError::Validation(e),
            FormError::Store(e) => TabulaError::Store(e),
            FormError::UnknownField { field } | FormError::ReadOnlyField { field } => {
                TabulaError::Reflection(ReflectionAccessError::NotWritable {
                    entity_type: "form".to_string(),
                    field,
                })
            }
        }
    }
}

pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_validation() {
        let err = FormError::from(ValidationError::RequiredFieldMissing {
            field: "name".to_string(),
        });
        assert_eq!(err.user_message(), "Please correct the highlighted fields.");
    }

    #[test]
    fn test_user_message_for_save_failure() {
        let err = FormError::from(StoreError::SaveFailed {
            entity_type: "Echo".to_string(),
            reason: "disk full".to_string(),
        });
        assert!(!err.user_message().contains("disk full"));
    }
}
