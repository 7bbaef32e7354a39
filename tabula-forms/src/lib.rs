//! TABULA Forms - Field Binding Engine
//!
//! Turns a model instance into per-field bindings: default resolution,
//! write-through data sync, validation and conditional visibility driven by
//! declared field dependencies.

pub mod binding;
pub mod choice;
pub mod config;
pub mod engine;
pub mod error;
pub mod surface;
pub mod validator;

pub use binding::{
    resolve_default, BindingState, ChangeListener, FieldBinding, FieldChange, VisibilityOutcome,
    READ_ONLY_SUFFIX,
};
pub use choice::{choices, selected_label, Choice};
pub use config::FormConfig;
pub use engine::FormBindingEngine;
pub use error::{FormError, FormResult};
pub use surface::{FieldSurface, NullSurface, RecordingSurface, SurfaceEvent};
pub use validator::{
    FieldValidator, LengthValidator, PatternValidator, RangeValidator, REQUIRED_MESSAGE,
};
