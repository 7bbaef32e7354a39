//! TABULA Core - Values, Metadata and Predicates
//!
//! Data types shared by every TABULA crate: dynamic field values, entity
//! identities, the model/entity contracts, declarative field metadata, and
//! the predicate composition registry. No I/O lives here.

pub mod error;
pub mod field;
pub mod filter;
pub mod identity;
pub mod metadata;
pub mod model;
pub mod registry;
pub mod value;

pub use error::{
    ConfigError, FilterError, MetadataError, ReflectionAccessError, StoreError, TabulaError,
    TabulaResult, ValidationError,
};
pub use field::{FieldDescriptor, FieldSpec, ModelSchema, VisibilityCondition, DEFAULT_ORDER};
pub use filter::{compare_by, CompareOp, Predicate, SortDirection, SortOrder};
pub use identity::Identity;
pub use metadata::{FieldMetadataIndex, ModelDescriptor};
pub use model::{kind_mismatch, not_writable, Entity, Model, Record};
pub use registry::{FilterContext, Fragment, FragmentFailurePolicy, PredicateRegistry, INIT_KEY};
pub use value::{truncate_chars, EnumVariant, FieldKind, Value, NULL_DISPLAY};
