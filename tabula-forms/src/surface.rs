//! Render surfaces.
//!
//! The widget toolkit is outside this crate. Each binding talks to one
//! [`FieldSurface`]; the UI feeds edits back through the engine.

use std::sync::{Arc, Mutex};
use tabula_core::{FieldDescriptor, Value};

/// What a binding can ask its widget to do.
pub trait FieldSurface: Send {
    /// Build the widget structure. No data yet.
    fn render_static(&mut self, descriptor: &FieldDescriptor);

    /// Show `value`. Must be idempotent.
    fn render_data(&mut self, value: &Value);

    /// Reset the widget display without touching data.
    fn clear(&mut self);

    fn set_visible(&mut self, visible: bool);

    /// Show or hide the inline error message.
    fn show_error(&mut self, message: Option<&str>);
}

/// Surface that discards everything. Used for headless forms.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl FieldSurface for NullSurface {
    fn render_static(&mut self, _descriptor: &FieldDescriptor) {}
    fn render_data(&mut self, _value: &Value) {}
    fn clear(&mut self) {}
    fn set_visible(&mut self, _visible: bool) {}
    fn show_error(&mut self, _message: Option<&str>) {}
}

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    RenderStatic { field: String },
    RenderData(Value),
    Clear,
    SetVisible(bool),
    ShowError(Option<String>),
}

/// Surface that records every call, for asserting render behaviour.
///
/// Clones share the same log, so a test can keep one handle while the
/// binding owns another.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    events: Arc<Mutex<Vec<SurfaceEvent>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Forget recorded calls.
    pub fn reset(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn render_data_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::RenderData(_)))
            .count()
    }

    /// Most recently rendered value.
    pub fn last_rendered(&self) -> Option<Value> {
        self.events().into_iter().rev().find_map(|e| match e {
            SurfaceEvent::RenderData(v) => Some(v),
            _ => None,
        })
    }

    /// Most recent error state, `None` when never shown.
    pub fn last_error(&self) -> Option<Option<String>> {
        self.events().into_iter().rev().find_map(|e| match e {
            SurfaceEvent::ShowError(m) => Some(m),
            _ => None,
        })
    }

    fn record(&self, event: SurfaceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl FieldSurface for RecordingSurface {
    fn render_static(&mut self, descriptor: &FieldDescriptor) {
        self.record(SurfaceEvent::RenderStatic {
            field: descriptor.name.clone(),
        });
    }

    fn render_data(&mut self, value: &Value) {
        self.record(SurfaceEvent::RenderData(value.clone()));
    }

    fn clear(&mut self) {
        self.record(SurfaceEvent::Clear);
    }

    fn set_visible(&mut self, visible: bool) {
        self.record(SurfaceEvent::SetVisible(visible));
    }

    fn show_error(&mut self, message: Option<&str>) {
        self.record(SurfaceEvent::ShowError(message.map(str::to_string)));
    }
}
