//! Per-field binding between a model and its render surface.
//!
//! A binding owns a private copy of the field's data. All writes go through
//! [`FieldBinding::set_data`], which stores the value, writes it through to
//! the model and notifies listeners, in that order.

use crate::surface::FieldSurface;
use crate::validator::{FieldValidator, REQUIRED_MESSAGE};
use tabula_core::{FieldDescriptor, Model, ReflectionAccessError, Value};

/// Suffix appended to titles of read-only fields.
pub const READ_ONLY_SUFFIX: &str = " (read-only)";

/// Lifecycle of a binding's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Uninitialized,
    Initialized,
    Cleared,
}

/// Result of a visibility re-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityOutcome {
    /// No condition depends on the changed field.
    Skipped,
    Unchanged { visible: bool },
    Shown,
    Hidden,
}

/// A committed data change.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

pub type ChangeListener = Box<dyn Fn(&FieldChange) + Send + Sync>;

/// Default chain: the model's current value when present, then the declared
/// default, then the kind's zero value. Identity fields never get a
/// fabricated key: they stay null until the store assigns one.
pub fn resolve_default(descriptor: &FieldDescriptor, model_value: Option<Value>) -> Value {
    match model_value {
        Some(value) if !value.is_null() => value,
        _ if descriptor.is_identity => Value::Null,
        _ => descriptor
            .default_value
            .clone()
            .unwrap_or_else(|| descriptor.kind.zero_value()),
    }
}

pub struct FieldBinding {
    descriptor: FieldDescriptor,
    data: Value,
    state: BindingState,
    visible: bool,
    error: Option<String>,
    auto_initialize: bool,
    surface: Box<dyn FieldSurface>,
    validator: Option<Box<dyn FieldValidator>>,
    listeners: Vec<ChangeListener>,
}

impl std::fmt::Debug for FieldBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("field", &self.descriptor.name)
            .field("data", &self.data)
            .field("state", &self.state)
            .field("visible", &self.visible)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl FieldBinding {
    pub fn new(
        descriptor: FieldDescriptor,
        surface: Box<dyn FieldSurface>,
        auto_initialize: bool,
    ) -> Self {
        let data = descriptor.kind.zero_value();
        Self {
            descriptor,
            data,
            state: BindingState::Uninitialized,
            visible: true,
            error: None,
            auto_initialize,
            surface,
            validator: None,
            listeners: Vec::new(),
        }
    }

    pub fn with_validator(mut self, validator: Box<dyn FieldValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn set_validator(&mut self, validator: Box<dyn FieldValidator>) {
        self.validator = Some(validator);
    }

    pub fn add_listener(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Heading shown above the widget.
    pub fn title(&self) -> String {
        if self.descriptor.editable {
            self.descriptor.display_name.clone()
        } else {
            format!("{}{}", self.descriptor.display_name, READ_ONLY_SUFFIX)
        }
    }

    /// Render the static surface, attach the error surface, derive initial
    /// data, then push it to the surface.
    pub fn initialize<M: Model>(&mut self, model: &mut M) -> Result<(), ReflectionAccessError> {
        tracing::debug!(field = %self.descriptor.name, "Initializing binding");
        self.surface.render_static(&self.descriptor);
        self.surface.show_error(None);
        self.init_data(model)?;
        self.state = BindingState::Initialized;
        self.push_view_data();
        Ok(())
    }

    /// With auto-initialize the default chain runs and writes through.
    /// Without it the binding only mirrors what the model already holds.
    fn init_data<M: Model>(&mut self, model: &mut M) -> Result<(), ReflectionAccessError> {
        let current = model.get(&self.descriptor.name);
        if !self.auto_initialize {
            self.data = current.unwrap_or(Value::Null);
            return Ok(());
        }
        let initial = resolve_default(&self.descriptor, current);
        self.set_data(model, initial)
    }

    /// Store `value`, write it through to the model, then notify listeners.
    ///
    /// If the model rejects the value the previous data is restored and no
    /// listener runs.
    pub fn set_data<M: Model>(
        &mut self,
        model: &mut M,
        value: Value,
    ) -> Result<(), ReflectionAccessError> {
        let old = std::mem::replace(&mut self.data, value);
        tracing::debug!(
            field = %self.descriptor.name,
            old = ?old,
            new = ?self.data,
            "Binding data changed"
        );

        if let Err(err) = model.set(&self.descriptor.name, self.data.clone()) {
            tracing::warn!(field = %self.descriptor.name, error = %err, "Model rejected value");
            self.data = old;
            return Err(err);
        }

        let change = FieldChange {
            field: self.descriptor.name.clone(),
            old,
            new: self.data.clone(),
        };
        for listener in &self.listeners {
            listener(&change);
        }
        Ok(())
    }

    /// Copy the model's value into the binding and show it.
    pub fn pull<M: Model>(&mut self, model: &M) -> Result<(), ReflectionAccessError> {
        let value = model
            .get(&self.descriptor.name)
            .ok_or_else(|| ReflectionAccessError::NotReadable {
                entity_type: entity_type_of::<M>(),
                field: self.descriptor.name.clone(),
            })?;
        self.data = value;
        self.push_view_data();
        Ok(())
    }

    /// Copy the binding's data into the model.
    pub fn push<M: Model>(&self, model: &mut M) -> Result<(), ReflectionAccessError> {
        model.set(&self.descriptor.name, self.data.clone())
    }

    /// Re-render the current data.
    pub fn push_view_data(&mut self) {
        self.surface.render_data(&self.data);
    }

    /// Re-evaluate visibility after `changed` was edited; `None` forces
    /// evaluation.
    ///
    /// Hiding a field leaves its data untouched. Becoming visible pushes the
    /// current data to the surface once.
    pub fn apply_visibility<M: Model>(&mut self, model: &M, changed: Option<&str>) -> VisibilityOutcome {
        let conditions = &self.descriptor.conditions;
        if conditions.is_empty() {
            return VisibilityOutcome::Skipped;
        }
        let should_evaluate = match changed {
            None => true,
            Some(field) => conditions.iter().any(|c| c.depends_on(field)),
        };
        if !should_evaluate {
            return VisibilityOutcome::Skipped;
        }

        let visible = conditions.iter().all(|c| c.evaluate(model));
        let was_visible = self.visible;
        self.visible = visible;
        self.surface.set_visible(visible);

        match (was_visible, visible) {
            (false, true) => {
                tracing::debug!(field = %self.descriptor.name, "Field shown");
                self.push_view_data();
                VisibilityOutcome::Shown
            }
            (true, false) => {
                tracing::debug!(field = %self.descriptor.name, "Field hidden");
                VisibilityOutcome::Hidden
            }
            _ => VisibilityOutcome::Unchanged { visible },
        }
    }

    /// Required check first, then the pluggable validator. Shows or clears
    /// the error surface.
    pub fn validate(&mut self) -> bool {
        let message = if !self.descriptor.nullable && self.data.is_empty() {
            Some(REQUIRED_MESSAGE.to_string())
        } else {
            self.validator.as_ref().and_then(|v| v.validate(&self.data))
        };

        match message {
            Some(message) => {
                tracing::warn!(
                    field = %self.descriptor.name,
                    reason = %message,
                    data = ?self.data,
                    "Field validation failed"
                );
                self.surface.show_error(Some(&message));
                self.error = Some(message);
                false
            }
            None => {
                self.clear_validation();
                true
            }
        }
    }

    pub fn clear_validation(&mut self) {
        self.error = None;
        self.surface.show_error(None);
    }

    /// Clear data, surface and validation. With auto-initialize the default
    /// chain runs again and the result is rendered.
    pub fn clear<M: Model>(&mut self, model: &mut M) -> Result<(), ReflectionAccessError> {
        tracing::debug!(field = %self.descriptor.name, "Clearing binding");
        self.data = if self.descriptor.is_identity {
            Value::Null
        } else {
            self.descriptor.kind.zero_value()
        };
        self.surface.clear();
        self.clear_validation();
        self.state = BindingState::Cleared;
        if self.auto_initialize {
            self.init_data(model)?;
            self.push_view_data();
        }
        Ok(())
    }
}

fn entity_type_of<M: Model>() -> String {
    tabula_core::FieldMetadataIndex::global()
        .describe::<M>()
        .entity_type
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, SurfaceEvent};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use tabula_core::{FieldKind, FieldSpec, ModelDescriptor, ModelSchema, Record};

    #[derive(Debug, Default)]
    struct Draft {
        values: BTreeMap<String, Value>,
    }

    impl Record for Draft {
        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "name" | "status" | "note" | "count" => {
                    Some(self.values.get(field).cloned().unwrap_or(Value::Null))
                }
                _ => None,
            }
        }
    }

    impl Model for Draft {
        fn schema() -> ModelSchema {
            ModelSchema::new("Draft")
                .field(FieldSpec::new("name", FieldKind::Text).required())
                .field(FieldSpec::new("status", FieldKind::enumeration(["NORMAL", "HIDDEN"])))
                .field(FieldSpec::new("note", FieldKind::Text).visible_when(
                    ["status"],
                    |r: &dyn Record| r.get("status") == Some(Value::Enum("HIDDEN".into())),
                ))
                .field(FieldSpec::new("count", FieldKind::Int).default_text("7"))
        }

        fn set(&mut self, field: &str, value: Value) -> Result<(), ReflectionAccessError> {
            if self.get(field).is_none() {
                return Err(tabula_core::not_writable("Draft", field));
            }
            self.values.insert(field.to_string(), value);
            Ok(())
        }
    }

    fn descriptor(name: &str) -> FieldDescriptor {
        ModelDescriptor::from_schema(Draft::schema())
            .field(name)
            .cloned()
            .unwrap()
    }

    fn binding(name: &str) -> (FieldBinding, RecordingSurface) {
        let surface = RecordingSurface::new();
        let binding = FieldBinding::new(descriptor(name), Box::new(surface.clone()), true);
        (binding, surface)
    }

    #[test]
    fn test_initialize_order() {
        let mut model = Draft::default();
        let (mut b, surface) = binding("count");
        b.initialize(&mut model).unwrap();
        assert_eq!(
            surface.events(),
            vec![
                SurfaceEvent::RenderStatic {
                    field: "count".to_string()
                },
                SurfaceEvent::ShowError(None),
                SurfaceEvent::RenderData(Value::Int(7)),
            ]
        );
        assert_eq!(b.state(), BindingState::Initialized);
    }

    #[test]
    fn test_default_chain_prefers_model_value() {
        let mut model = Draft::default();
        model.set("count", Value::Int(3)).unwrap();
        let (mut b, _) = binding("count");
        b.initialize(&mut model).unwrap();
        assert_eq!(b.data(), &Value::Int(3));
    }

    #[test]
    fn test_default_chain_falls_back_to_zero() {
        let mut model = Draft::default();
        let (mut b, _) = binding("name");
        b.initialize(&mut model).unwrap();
        assert_eq!(b.data(), &Value::text(""));
        assert_eq!(model.get("name"), Some(Value::text("")));
    }

    #[test]
    fn test_set_data_writes_through_and_notifies() {
        let mut model = Draft::default();
        let (mut b, _) = binding("name");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        b.add_listener(Box::new(move |c: &FieldChange| {
            sink.lock().unwrap().push(c.clone());
        }));

        b.set_data(&mut model, Value::text("red")).unwrap();
        assert_eq!(b.data(), &Value::text("red"));
        assert_eq!(model.get("name"), Some(Value::text("red")));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].new, Value::text("red"));
    }

    #[test]
    fn test_rejected_write_restores_data() {
        struct Locked;
        impl Record for Locked {
            fn get(&self, _field: &str) -> Option<Value> {
                Some(Value::Null)
            }
        }
        impl Model for Locked {
            fn schema() -> ModelSchema {
                Draft::schema()
            }
            fn set(&mut self, field: &str, _v: Value) -> Result<(), ReflectionAccessError> {
                Err(tabula_core::not_writable("Locked", field))
            }
        }

        let (mut b, _) = binding("name");
        let err = b.set_data(&mut Locked, Value::text("x")).unwrap_err();
        assert!(matches!(err, ReflectionAccessError::NotWritable { .. }));
        assert_eq!(b.data(), &Value::text(""));
    }

    #[test]
    fn test_validate_required_message() {
        let mut model = Draft::default();
        let (mut b, surface) = binding("name");
        b.initialize(&mut model).unwrap();
        assert!(!b.validate());
        assert_eq!(b.error(), Some(REQUIRED_MESSAGE));
        assert_eq!(surface.last_error(), Some(Some(REQUIRED_MESSAGE.to_string())));

        b.set_data(&mut model, Value::text("ok")).unwrap();
        assert!(b.validate());
        assert_eq!(b.error(), None);
        assert_eq!(surface.last_error(), Some(None));
    }

    #[test]
    fn test_validator_runs_after_required_check() {
        let mut model = Draft::default();
        let (b, _) = binding("name");
        let mut b = b.with_validator(Box::new(crate::validator::LengthValidator::at_most(3)));
        b.set_data(&mut model, Value::text("long name")).unwrap();
        assert!(!b.validate());
        assert!(b.error().is_some_and(|e| e.contains("at most 3")));
    }

    #[test]
    fn test_visibility_skips_unrelated_change() {
        let mut model = Draft::default();
        let (mut b, _) = binding("note");
        b.initialize(&mut model).unwrap();
        assert_eq!(b.apply_visibility(&model, Some("name")), VisibilityOutcome::Skipped);
        assert_eq!(b.apply_visibility(&model, Some("status")), VisibilityOutcome::Hidden);
    }

    #[test]
    fn test_hide_keeps_data_and_show_pushes_once() {
        let mut model = Draft::default();
        let (mut b, surface) = binding("note");
        b.initialize(&mut model).unwrap();
        b.set_data(&mut model, Value::text("kept")).unwrap();

        assert_eq!(b.apply_visibility(&model, None), VisibilityOutcome::Hidden);
        assert_eq!(b.data(), &Value::text("kept"));

        surface.reset();
        model.set("status", Value::Enum("HIDDEN".into())).unwrap();
        assert_eq!(b.apply_visibility(&model, Some("status")), VisibilityOutcome::Shown);
        assert_eq!(surface.render_data_count(), 1);
        assert_eq!(surface.last_rendered(), Some(Value::text("kept")));

        assert_eq!(
            b.apply_visibility(&model, Some("status")),
            VisibilityOutcome::Unchanged { visible: true }
        );
    }

    #[test]
    fn test_clear_reinitializes_from_model() {
        let mut model = Draft::default();
        let (mut b, surface) = binding("count");
        b.initialize(&mut model).unwrap();
        b.set_data(&mut model, Value::Int(42)).unwrap();
        b.validate();

        surface.reset();
        b.clear(&mut model).unwrap();
        assert_eq!(b.state(), BindingState::Cleared);
        assert_eq!(b.data(), &Value::Int(42));
        assert_eq!(surface.events()[0], SurfaceEvent::Clear);
        assert_eq!(surface.last_rendered(), Some(Value::Int(42)));
    }

    #[test]
    fn test_initialize_without_auto_initialize_mirrors_model() {
        let mut model = Draft::default();
        model.set("count", Value::Int(12)).unwrap();
        let surface = RecordingSurface::new();
        let mut b = FieldBinding::new(descriptor("count"), Box::new(surface.clone()), false);
        b.initialize(&mut model).unwrap();
        assert_eq!(b.data(), &Value::Int(12));
        assert_eq!(surface.last_rendered(), Some(Value::Int(12)));

        // No default is applied to fields the model leaves empty.
        let mut name =
            FieldBinding::new(descriptor("name"), Box::new(crate::surface::NullSurface), false);
        name.initialize(&mut model).unwrap();
        assert_eq!(name.data(), &Value::Null);
        assert_eq!(model.get("name"), Some(Value::Null));
    }

    #[test]
    fn test_clear_without_auto_initialize_leaves_zero() {
        let mut model = Draft::default();
        model.set("count", Value::Int(5)).unwrap();
        let surface = RecordingSurface::new();
        let mut b = FieldBinding::new(descriptor("count"), Box::new(surface.clone()), false);
        b.initialize(&mut model).unwrap();
        assert_eq!(b.data(), &Value::Int(5));
        b.clear(&mut model).unwrap();
        assert_eq!(b.data(), &Value::Int(0));
        assert_eq!(model.get("count"), Some(Value::Int(5)));
        assert_eq!(surface.render_data_count(), 1);
    }

    #[test]
    fn test_clear_resets_identity_to_null() {
        let schema = ModelSchema::new("T").field(FieldSpec::new("id", FieldKind::Int).identity());
        let desc = ModelDescriptor::from_schema(schema).fields[0].clone();
        let mut b = FieldBinding::new(desc, Box::new(crate::surface::NullSurface), false);
        let mut model = Draft::default();
        b.clear(&mut model).unwrap();
        assert_eq!(b.data(), &Value::Null);
    }

    #[test]
    fn test_pull_and_push() {
        let mut model = Draft::default();
        let (mut b, _) = binding("name");
        model.set("name", Value::text("from model")).unwrap();
        b.pull(&model).unwrap();
        assert_eq!(b.data(), &Value::text("from model"));

        let mut other = Draft::default();
        b.push(&mut other).unwrap();
        assert_eq!(other.get("name"), Some(Value::text("from model")));
    }

    #[test]
    fn test_title_marks_read_only() {
        let schema = ModelSchema::new("T").field(FieldSpec::new("id", FieldKind::Int).identity());
        let desc = ModelDescriptor::from_schema(schema).fields[0].clone();
        let b = FieldBinding::new(desc, Box::new(crate::surface::NullSurface), true);
        assert_eq!(b.title(), "id (read-only)");
    }
}
