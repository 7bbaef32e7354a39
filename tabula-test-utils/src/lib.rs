//! TABULA Test Utilities
//!
//! Shared test infrastructure for the TABULA workspace:
//! - The `Echo` fixture entity and seeded mock stores
//! - Proptest generators for values, identities and entities
//! - Custom assertions for store results
//! - Tracing setup for tests

// Re-export mock storage from its source crate
pub use tabula_storage::{EntityStore, MockStore, StoreOp};

// Re-export core types for convenience
pub use tabula_core::{
    Entity, EnumVariant, FieldKind, FieldSpec, Identity, Model, ModelSchema, Predicate, Record,
    ReflectionAccessError, SortOrder, StoreError, Value,
};

use chrono::{DateTime, Utc};

// ============================================================================
// FIXTURE ENTITY
// ============================================================================

/// Display status of an [`Echo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EchoStatus {
    Normal,
    Hidden,
}

impl EchoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EchoStatus::Normal => "NORMAL",
            EchoStatus::Hidden => "HIDDEN",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NORMAL" => Some(EchoStatus::Normal),
            "HIDDEN" => Some(EchoStatus::Hidden),
            _ => None,
        }
    }

    pub fn kind() -> FieldKind {
        FieldKind::Enum {
            variants: vec![
                EnumVariant::new("NORMAL").with_description("Shown in lists"),
                EnumVariant::new("HIDDEN").with_description("Hidden from lists"),
            ],
        }
    }
}

/// Small entity covering every field kind the engine handles.
///
/// `note` is only visible while `status` is `HIDDEN`; `scratch` is transient.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Echo {
    pub id: Option<i64>,
    pub name: String,
    pub message: Option<String>,
    pub count: i64,
    pub status: Option<EchoStatus>,
    pub note: Option<String>,
    pub flag: bool,
    pub keywords: Vec<String>,
    pub created: Option<DateTime<Utc>>,
    pub scratch: String,
}

impl Echo {
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        Self {
            name: name.into(),
            count,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: EchoStatus) -> Self {
        self.status = Some(status);
        self
    }
}

fn optional_text(value: &Option<String>) -> Value {
    value.clone().map(Value::Text).unwrap_or(Value::Null)
}

impl Record for Echo {
    fn get(&self, field: &str) -> Option<Value> {
        let value = match field {
            "id" => self.id.into(),
            "name" => Value::Text(self.name.clone()),
            "message" => optional_text(&self.message),
            "count" => Value::Int(self.count),
            "status" => self
                .status
                .map(|s| Value::Enum(s.as_str().to_string()))
                .unwrap_or(Value::Null),
            "note" => optional_text(&self.note),
            "flag" => Value::Bool(self.flag),
            "keywords" => Value::List(self.keywords.iter().cloned().map(Value::Text).collect()),
            "created" => self.created.map(Value::Timestamp).unwrap_or(Value::Null),
            _ => return None,
        };
        Some(value)
    }
}

impl Model for Echo {
    fn schema() -> ModelSchema {
        ModelSchema::new("Echo")
            .field(FieldSpec::new("id", FieldKind::Int).identity().title("ID"))
            .field(
                FieldSpec::new("name", FieldKind::Text)
                    .title("Name")
                    .order(10)
                    .searchable()
                    .required(),
            )
            .field(
                FieldSpec::new("count", FieldKind::Int)
                    .title("Count")
                    .order(20)
                    .searchable()
                    .default_text("1"),
            )
            .field(
                FieldSpec::new("status", EchoStatus::kind())
                    .title("Status")
                    .order(30)
                    .default_text("NORMAL"),
            )
            .field(
                FieldSpec::new("note", FieldKind::Text)
                    .title("Note")
                    .order(40)
                    .visible_when(["status"], |r: &dyn Record| {
                        r.get("status") == Some(Value::Enum("HIDDEN".to_string()))
                    }),
            )
            .field(FieldSpec::new("message", FieldKind::Text).title("Message").order(50))
            .field(FieldSpec::new("flag", FieldKind::Bool).title("Flag").order(60))
            .field(
                FieldSpec::new("keywords", FieldKind::list_of(FieldKind::Text))
                    .title("Keywords")
                    .order(70)
                    .unsortable(),
            )
            .field(
                FieldSpec::new("created", FieldKind::Timestamp)
                    .title("Created")
                    .order(80)
                    .read_only(),
            )
            .field(FieldSpec::new("scratch", FieldKind::Text).transient())
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), ReflectionAccessError> {
        let mismatch = |v: &Value| tabula_core::kind_mismatch("Echo", field, v);
        match (field, value) {
            ("id", Value::Int(v)) => self.id = Some(v),
            ("id", Value::Null) => self.id = None,
            ("name", Value::Text(v)) => self.name = v,
            ("message", Value::Text(v)) => self.message = Some(v),
            ("message", Value::Null) => self.message = None,
            ("count", Value::Int(v)) => self.count = v,
            ("status", Value::Enum(name)) => {
                let status = EchoStatus::from_name(&name)
                    .ok_or_else(|| mismatch(&Value::Enum(name.clone())))?;
                self.status = Some(status);
            }
            ("status", Value::Null) => self.status = None,
            ("note", Value::Text(v)) => self.note = Some(v),
            ("note", Value::Null) => self.note = None,
            ("flag", Value::Bool(v)) => self.flag = v,
            ("keywords", Value::List(items)) => {
                self.keywords = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Text(s) => Ok(s),
                        other => Err(mismatch(&other)),
                    })
                    .collect::<Result<_, _>>()?;
            }
            ("keywords", Value::Null) => self.keywords.clear(),
            ("created", Value::Timestamp(v)) => self.created = Some(v),
            ("created", Value::Null) => self.created = None,
            (
                "id" | "name" | "message" | "count" | "status" | "note" | "flag" | "keywords"
                | "created",
                other,
            ) => return Err(mismatch(&other)),
            (unknown, _) => return Err(tabula_core::not_writable("Echo", unknown)),
        }
        Ok(())
    }
}

impl Entity for Echo {
    fn identity(&self) -> Option<Identity> {
        self.id.map(Identity::Int)
    }

    fn assign_identity(&mut self, identity: Identity) {
        if let Identity::Int(v) = identity {
            self.id = Some(v);
        }
    }
}

// ============================================================================
// TRACING
// ============================================================================

/// Install a test-friendly fmt subscriber once. Honors `RUST_LOG`.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built entities and stores for common scenarios.

    use super::*;

    /// `n` echoes named `echo-00`, `echo-01`, ... with `count == index`.
    pub fn echoes(n: usize) -> Vec<Echo> {
        (0..n)
            .map(|i| Echo::new(format!("echo-{:02}", i), i as i64))
            .collect()
    }

    /// Store with `n` echoes and identities `1..=n` in insertion order.
    pub fn seeded_store(n: usize) -> MockStore<Echo> {
        store_with(echoes(n))
    }

    /// Store holding exactly `entities`.
    pub fn store_with(entities: Vec<Echo>) -> MockStore<Echo> {
        match MockStore::with_entities(entities) {
            Ok(store) => store,
            Err(err) => panic!("Seeding mock store failed: {}", err),
        }
    }

    /// Echoes whose names are colours, for search scenarios.
    pub fn palette() -> Vec<Echo> {
        vec![
            Echo::new("Red", 1),
            Echo::new("blue", 2),
            Echo::new("Bored", 3),
            Echo::new("green", 4),
            Echo::new("infrared", 5),
        ]
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for TABULA types.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_identity() -> impl Strategy<Value = Identity> {
        prop_oneof![
            any::<i64>().prop_map(Identity::Int),
            any::<u128>().prop_map(|n| Identity::Uuid(uuid::Uuid::from_u128(n))),
            "[a-z0-9]{1,12}".prop_map(Identity::Text),
        ]
    }

    pub fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            "[a-zA-Z ]{0,16}".prop_map(Value::Text),
            prop_oneof![Just("NORMAL"), Just("HIDDEN")].prop_map(|s| Value::Enum(s.to_string())),
        ]
    }

    pub fn arb_echo_status() -> impl Strategy<Value = EchoStatus> {
        prop_oneof![Just(EchoStatus::Normal), Just(EchoStatus::Hidden)]
    }

    /// Unsaved echo with arbitrary content.
    pub fn arb_echo() -> impl Strategy<Value = Echo> {
        (
            "[a-z]{1,10}",
            0i64..1000,
            proptest::option::of(arb_echo_status()),
            any::<bool>(),
        )
            .prop_map(|(name, count, status, flag)| Echo {
                name,
                count,
                status,
                flag,
                ..Echo::default()
            })
    }

    /// Distinct identity sets for selection scenarios.
    pub fn arb_identity_set(max: usize) -> impl Strategy<Value = Vec<Identity>> {
        proptest::collection::btree_set(1i64..500, 0..max)
            .prop_map(|ids| ids.into_iter().map(Identity::Int).collect())
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for store results and rows.

    use super::*;

    /// Assert that `rows` carry exactly `expected` identities, in order.
    #[track_caller]
    pub fn assert_ids(rows: &[Echo], expected: &[i64]) {
        let ids: Vec<i64> = rows.iter().filter_map(|e| e.id).collect();
        assert_eq!(ids, expected, "Unexpected row identities");
    }

    /// Assert that a store result is a page failure.
    #[track_caller]
    pub fn assert_page_failed<T: std::fmt::Debug>(result: &Result<T, StoreError>) {
        match result {
            Err(StoreError::PageFailed { .. }) => {}
            other => panic!("Expected PageFailed, got: {:?}", other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
