//! In-memory store for tests and demos.

use crate::store::{page_offset, EntityStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tabula_core::{
    compare_by, Entity, FieldKind, FieldMetadataIndex, Identity, Predicate, SortOrder, StoreError,
};
use uuid::Uuid;

/// Store operation, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Count,
    Page,
    Save,
}

/// In-memory [`EntityStore`] that evaluates predicates directly.
#[derive(Debug)]
pub struct MockStore<E: Entity> {
    entity_type: String,
    rows: Arc<RwLock<BTreeMap<Identity, E>>>,
    next_id: AtomicI64,
    fail_next: Mutex<HashSet<StoreOp>>,
    count_calls: AtomicUsize,
    page_calls: AtomicUsize,
    save_calls: AtomicUsize,
}

impl<E: Entity> Default for MockStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MockStore<E> {
    /// Create an empty store.
    pub fn new() -> Self {
        let entity_type = FieldMetadataIndex::global()
            .describe::<E>()
            .entity_type
            .clone();
        Self {
            entity_type,
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicI64::new(1),
            fail_next: Mutex::new(HashSet::new()),
            count_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
        }
    }

    /// Create a store holding `entities`, assigning identities where missing.
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Result<Self, StoreError> {
        let store = Self::new();
        for entity in entities {
            store.insert(entity)?;
        }
        Ok(store)
    }

    /// Insert synchronously. Returns the stored identity.
    pub fn insert(&self, mut entity: E) -> Result<Identity, StoreError> {
        let identity = self.claim_identity(&mut entity);
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        rows.insert(identity.clone(), entity);
        Ok(identity)
    }

    /// Fetch by identity.
    pub fn get(&self, identity: &Identity) -> Result<Option<E>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rows.get(identity).cloned())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Remove every entity.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .clear();
        Ok(())
    }

    /// Make the next call of `op` fail once.
    pub fn fail_next(&self, op: StoreOp) {
        if let Ok(mut pending) = self.fail_next.lock() {
            pending.insert(op);
        }
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    fn take_failure(&self, op: StoreOp) -> bool {
        self.fail_next
            .lock()
            .map(|mut pending| pending.remove(&op))
            .unwrap_or(false)
    }

    /// Identity the entity is stored under. Missing identities are
    /// allocated; explicit integer identities move the counter past them so
    /// later creates never collide.
    fn claim_identity(&self, entity: &mut E) -> Identity {
        match entity.identity() {
            Some(id) => {
                if let Identity::Int(v) = id {
                    self.next_id.fetch_max(v.saturating_add(1), Ordering::SeqCst);
                }
                id
            }
            None => {
                let id = self.allocate_identity();
                entity.assign_identity(id.clone());
                id
            }
        }
    }

    fn allocate_identity(&self) -> Identity {
        let descriptor = FieldMetadataIndex::global().describe::<E>();
        match descriptor.identity_field().map(|f| &f.kind) {
            Some(FieldKind::Uuid) => Identity::Uuid(Uuid::now_v7()),
            Some(FieldKind::Text) => Identity::Text(Uuid::now_v7().to_string()),
            _ => Identity::Int(self.next_id.fetch_add(1, Ordering::SeqCst)),
        }
    }

    fn matching(&self, predicate: &Predicate) -> Result<Vec<E>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rows
            .values()
            .filter(|e| predicate.evaluate(*e))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for MockStore<E> {
    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_failure(StoreOp::Count) {
            return Err(StoreError::CountFailed {
                entity_type: self.entity_type.clone(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(self.matching(predicate)?.len() as u64)
    }

    async fn page(
        &self,
        page_index: u64,
        page_size: u64,
        predicate: &Predicate,
        sort: &[SortOrder],
    ) -> Result<Vec<E>, StoreError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if page_size == 0 {
            return Err(StoreError::InvalidWindow {
                reason: "page size must be positive".to_string(),
            });
        }
        if self.take_failure(StoreOp::Page) {
            return Err(StoreError::PageFailed {
                entity_type: self.entity_type.clone(),
                page_index,
                page_size,
                reason: "injected failure".to_string(),
            });
        }

        // Rows come out of the map in identity order, so the sort is stable
        // across calls even when the sort keys tie.
        let mut rows = self.matching(predicate)?;
        rows.sort_by(|a, b| compare_by(sort, a, b));

        let offset = usize::try_from(page_offset(page_index, page_size)).unwrap_or(usize::MAX);
        let limit = usize::try_from(page_size).unwrap_or(usize::MAX);
        tracing::trace!(
            entity_type = %self.entity_type,
            page_index,
            page_size,
            matched = rows.len(),
            "Mock page fetch"
        );
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn save(&self, entity: E) -> Result<E, StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_failure(StoreOp::Save) {
            return Err(StoreError::SaveFailed {
                entity_type: self.entity_type.clone(),
                reason: "injected failure".to_string(),
            });
        }
        let mut saved = entity;
        let identity = self.claim_identity(&mut saved);
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        rows.insert(identity, saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{
        FieldSpec, Model, ModelSchema, Record, ReflectionAccessError, Value,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: Option<i64>,
        label: String,
    }

    impl Tag {
        fn new(label: &str) -> Self {
            Self {
                id: None,
                label: label.to_string(),
            }
        }
    }

    impl Record for Tag {
        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(self.id.into()),
                "label" => Some(Value::text(&self.label)),
                _ => None,
            }
        }
    }

    impl Model for Tag {
        fn schema() -> ModelSchema {
            ModelSchema::new("Tag")
                .field(FieldSpec::new("id", FieldKind::Int).identity())
                .field(FieldSpec::new("label", FieldKind::Text).searchable())
        }

        fn set(&mut self, field: &str, value: Value) -> Result<(), ReflectionAccessError> {
            match (field, value) {
                ("label", Value::Text(v)) => self.label = v,
                (f, v) => return Err(tabula_core::kind_mismatch("Tag", f, &v)),
            }
            Ok(())
        }
    }

    impl Entity for Tag {
        fn identity(&self) -> Option<Identity> {
            self.id.map(Identity::Int)
        }

        fn assign_identity(&mut self, identity: Identity) {
            if let Identity::Int(v) = identity {
                self.id = Some(v);
            }
        }
    }

    fn store(n: usize) -> MockStore<Tag> {
        MockStore::with_entities((0..n).map(|i| Tag::new(&format!("tag-{:02}", i)))).unwrap()
    }

    #[tokio::test]
    async fn test_count_and_page_window() {
        let store = store(23);
        assert_eq!(store.count(&Predicate::Always).await.unwrap(), 23);

        let sort = vec![SortOrder::asc("id")];
        let last = store.page(2, 10, &Predicate::Always, &sort).await.unwrap();
        assert_eq!(last.len(), 3);
        assert_eq!(last[0].id, Some(21));

        let past = store.page(5, 10, &Predicate::Always, &sort).await.unwrap();
        assert!(past.is_empty());
    }

    #[tokio::test]
    async fn test_page_filters_and_sorts() {
        let store = store(12);
        let pred = Predicate::contains("label", "TAG-1");
        assert_eq!(store.count(&pred).await.unwrap(), 2);
        let rows = store
            .page(0, 10, &pred, &[SortOrder::desc("id")])
            .await
            .unwrap();
        let labels: Vec<_> = rows.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["tag-11", "tag-10"]);
    }

    #[tokio::test]
    async fn test_zero_page_size_is_invalid() {
        let err = store(1)
            .page(0, 0, &Predicate::Always, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidWindow { .. }));
    }

    #[tokio::test]
    async fn test_save_assigns_identity() {
        let store = store(2);
        let saved = store.save(Tag::new("fresh")).await.unwrap();
        assert_eq!(saved.id, Some(3));
        assert_eq!(store.len().unwrap(), 3);

        let mut edited = saved.clone();
        edited.label = "renamed".to_string();
        store.save(edited).await.unwrap();
        assert_eq!(store.len().unwrap(), 3);
        assert_eq!(
            store.get(&Identity::Int(3)).unwrap().map(|t| t.label),
            Some("renamed".to_string())
        );
    }

    #[tokio::test]
    async fn test_save_with_explicit_identity_advances_counter() {
        let store = store(2);
        let mut imported = Tag::new("imported");
        imported.id = Some(10);
        store.save(imported).await.unwrap();

        let fresh = store.save(Tag::new("fresh")).await.unwrap();
        assert_eq!(fresh.id, Some(11));
        assert_eq!(
            store.get(&Identity::Int(10)).unwrap().map(|t| t.label),
            Some("imported".to_string())
        );
        assert_eq!(store.len().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let store = store(3);
        store.fail_next(StoreOp::Count);
        assert!(matches!(
            store.count(&Predicate::Always).await,
            Err(StoreError::CountFailed { .. })
        ));
        assert_eq!(store.count(&Predicate::Always).await.unwrap(), 3);
        assert_eq!(store.count_calls(), 2);
    }
}
