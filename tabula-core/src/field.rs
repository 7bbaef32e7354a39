//! Field declarations and descriptors.
//!
//! Models declare their fields with [`FieldSpec`] builders collected into a
//! [`ModelSchema`]. The metadata index turns a schema into immutable
//! [`FieldDescriptor`]s.

use crate::model::Record;
use crate::value::{FieldKind, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Order given to fields that do not declare one.
pub const DEFAULT_ORDER: i32 = 100;

type ConditionFn = dyn Fn(&dyn Record) -> bool + Send + Sync;

/// Predicate over the bound model deciding whether a field is shown.
///
/// `dependencies` names the fields the predicate reads. An empty set means
/// "re-evaluate on every change".
#[derive(Clone)]
pub struct VisibilityCondition {
    predicate: Arc<ConditionFn>,
    dependencies: BTreeSet<String>,
}

impl VisibilityCondition {
    pub fn new<I, S, F>(dependencies: I, predicate: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&dyn Record) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }

    pub fn evaluate(&self, record: &dyn Record) -> bool {
        (self.predicate)(record)
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Whether a change to `field` requires re-evaluating this condition.
    pub fn depends_on(&self, field: &str) -> bool {
        self.dependencies.is_empty() || self.dependencies.contains(field)
    }
}

impl fmt::Debug for VisibilityCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityCondition")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Declarative options for one field, set at schema registration.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: i32,
    pub editable: bool,
    pub searchable: bool,
    pub sortable: bool,
    pub frozen: bool,
    pub identity: bool,
    pub nullable: bool,
    pub transient: bool,
    pub default_text: Option<String>,
    pub conditions: Vec<VisibilityCondition>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            title: None,
            description: None,
            order: DEFAULT_ORDER,
            editable: true,
            searchable: false,
            sortable: true,
            frozen: false,
            identity: false,
            nullable: true,
            transient: false,
            default_text: None,
            conditions: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Mark as the primary key. Identity fields are read-only and frozen.
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self.editable = false;
        self.frozen = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn default_text(mut self, raw: impl Into<String>) -> Self {
        self.default_text = Some(raw.into());
        self
    }

    pub fn visible_when<I, S, F>(mut self, dependencies: I, predicate: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&dyn Record) -> bool + Send + Sync + 'static,
    {
        self.conditions
            .push(VisibilityCondition::new(dependencies, predicate));
        self
    }
}

/// Ordered list of field declarations for one model type.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }
}

/// Immutable, resolved description of one displayable field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub order: i32,
    pub editable: bool,
    pub searchable: bool,
    pub sortable: bool,
    pub frozen: bool,
    pub is_identity: bool,
    pub nullable: bool,
    pub kind: FieldKind,
    /// Declared default, already converted. `None` when absent or malformed.
    pub default_value: Option<Value>,
    pub conditions: Vec<VisibilityCondition>,
    /// Position in the schema, used as the final sort key.
    pub declaration_index: usize,
}

impl FieldDescriptor {
    /// Union of the dependency names of every visibility condition.
    pub fn dependency_names(&self) -> BTreeSet<String> {
        self.conditions
            .iter()
            .flat_map(|c| c.dependencies().iter().cloned())
            .collect()
    }

    /// Display sort key. Frozen and identity columns come first whatever
    /// their declared order, then declared order, then declaration order.
    pub fn sort_key(&self) -> (bool, i32, usize) {
        (
            !(self.frozen || self.is_identity),
            self.order,
            self.declaration_index,
        )
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }
}
