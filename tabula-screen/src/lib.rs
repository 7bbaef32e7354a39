//! TABULA Screen - Paginated Grids and Entity Selection
//!
//! A [`DataController`] pages through an [`tabula_storage::EntityStore`]
//! with a composed predicate, a [`SelectionTracker`] keeps the selection
//! across pages, and [`EntityScreen`] combines both into a picker that can
//! also edit rows through `tabula_forms`.

pub mod config;
pub mod controller;
pub mod error;
pub mod notifications;
pub mod screen;
pub mod selection;

pub use config::{ConfigLoadError, ScreenConfig, DEFAULT_DISPLAY_TRUNCATE, DEFAULT_PAGE_SIZE};
pub use controller::{
    ChunkRequest, Column, DataController, DetailRow, GridRow, LoadRequest, LoadResponse,
    LoadState, SEARCH_KEY,
};
pub use error::{ScreenError, ScreenResult};
pub use notifications::{Notification, NotificationAction, NotificationLevel};
pub use screen::{CustomFilter, EntityScreen, ID_SEARCH_KEY, MAX_NOTIFICATIONS};
pub use selection::{SelectionMode, SelectionTracker};
