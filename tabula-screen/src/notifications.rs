//! Messages a screen raises for the person using it.
//!
//! Notifications only ever carry [`ScreenError::user_message`] text; the
//! error itself goes to the log.

use crate::error::ScreenError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// What the screen offers next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Re-issue the failed load.
    Retry,
    /// Drop the filter that could not be built.
    ResetFilters,
    Dismiss,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub entity_type: String,
    pub message: String,
    pub action: Option<NotificationAction>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        entity_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            entity_type: entity_type.into(),
            message: message.into(),
            action: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Error notification for a failed screen operation.
    pub fn from_error(entity_type: impl Into<String>, err: &ScreenError) -> Self {
        let entity_type = entity_type.into();
        tracing::debug!(entity_type = %entity_type, error = %err, "Notifying screen failure");
        let action = match err {
            ScreenError::Store(_) => NotificationAction::Retry,
            ScreenError::Filter(_) => NotificationAction::ResetFilters,
            ScreenError::Config(_) => NotificationAction::Dismiss,
        };
        Self::new(NotificationLevel::Error, entity_type, err.user_message()).with_action(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{FilterError, StoreError};

    #[test]
    fn test_store_error_offers_retry_without_internals() {
        let err = ScreenError::Store(StoreError::PageFailed {
            entity_type: "Echo".to_string(),
            page_index: 3,
            page_size: 10,
            reason: "connection reset by peer".to_string(),
        });
        let note = Notification::from_error("Echo", &err);
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(note.action, Some(NotificationAction::Retry));
        assert_eq!(note.message, "Loading data failed. Please try again.");
        assert!(!note.message.contains("peer"));
    }

    #[test]
    fn test_filter_error_offers_reset() {
        let err = ScreenError::Filter(FilterError::UnknownField {
            entity_type: "Echo".to_string(),
            field: "ghost".to_string(),
        });
        let note = Notification::from_error("Echo", &err);
        assert_eq!(note.action, Some(NotificationAction::ResetFilters));
        assert_eq!(note.entity_type, "Echo");
    }
}
