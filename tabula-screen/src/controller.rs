//! Paginated data controller.
//!
//! A load runs in three steps so a slow response can never overwrite a newer
//! one:
//!
//! 1. [`DataController::prepare_load`] snapshots the predicate, sort and
//!    window into a [`LoadRequest`] stamped with a fresh sequence number.
//! 2. [`LoadRequest::execute`] talks to the store. It borrows nothing from
//!    the controller.
//! 3. [`DataController::apply`] installs the response, unless a newer request
//!    was issued in the meantime.
//!
//! [`DataController::refresh`] runs all three back to back.

use crate::config::ScreenConfig;
use crate::error::{ScreenError, ScreenResult};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tabula_core::{
    ConfigError, Entity, FieldMetadataIndex, FilterContext, Fragment, Identity, ModelDescriptor,
    Predicate, PredicateRegistry, SortOrder, StoreError, Value,
};
use tabula_storage::{page_count, EntityStore};

/// Registry key of the free-text search fragment.
pub const SEARCH_KEY: &str = "search";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    /// Last load failed; the previous rows are still shown.
    Error,
}

/// Snapshot of one load, detached from the controller.
#[derive(Debug, Clone)]
pub struct LoadRequest<E> {
    seq: u64,
    page_index: u64,
    page_size: u64,
    predicate: Predicate,
    sort: Vec<SortOrder>,
    entity_type: String,
    _entity: PhantomData<fn() -> E>,
}

#[derive(Debug)]
pub struct LoadResponse<E> {
    seq: u64,
    outcome: Result<LoadedPage<E>, StoreError>,
}

#[derive(Debug)]
struct LoadedPage<E> {
    page_index: u64,
    total: u64,
    rows: Vec<E>,
}

impl<E: Entity> LoadRequest<E> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn sort(&self) -> &[SortOrder] {
        &self.sort
    }

    /// Count, clamp the page into range, then fetch it. Count and page use
    /// the same predicate snapshot.
    pub async fn execute<S>(self, store: &S) -> LoadResponse<E>
    where
        S: EntityStore<E> + ?Sized,
    {
        let outcome = self.fetch(store).await;
        LoadResponse {
            seq: self.seq,
            outcome,
        }
    }

    async fn fetch<S>(&self, store: &S) -> Result<LoadedPage<E>, StoreError>
    where
        S: EntityStore<E> + ?Sized,
    {
        let total = store.count(&self.predicate).await?;
        let pages = page_count(total, self.page_size);
        if pages == 0 {
            return Ok(LoadedPage {
                page_index: 0,
                total,
                rows: Vec::new(),
            });
        }
        let page_index = self.page_index.min(pages - 1);
        let rows = store
            .page(page_index, self.page_size, &self.predicate, &self.sort)
            .await?;
        tracing::debug!(
            entity_type = %self.entity_type,
            seq = self.seq,
            page = page_index,
            size = self.page_size,
            count = total,
            "Page loaded"
        );
        Ok(LoadedPage {
            page_index,
            total,
            rows,
        })
    }
}

/// One grid column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: String,
    pub title: String,
    pub sortable: bool,
    pub frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub identity: Option<Identity>,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

/// Lazy-loading request in offset/limit terms, as issued by scrolling grids.
#[derive(Debug, Clone, Default)]
pub struct ChunkRequest {
    pub offset: u64,
    pub limit: u64,
    pub filter_text: Option<String>,
    pub sort: Vec<SortOrder>,
}

pub struct DataController<E: Entity> {
    descriptor: Arc<ModelDescriptor>,
    registry: PredicateRegistry,
    extensions: BTreeMap<String, Fragment>,
    filter_text: String,
    search_enabled: bool,
    sort: Vec<SortOrder>,
    default_sort: Option<SortOrder>,
    page_index: u64,
    /// Page the next load asks for; becomes `page_index` once applied.
    target_page: u64,
    page_size: u64,
    display_truncate: usize,
    total: u64,
    rows: Vec<E>,
    state: LoadState,
    last_error: Option<StoreError>,
    seq: u64,
}

impl<E: Entity + std::fmt::Debug> std::fmt::Debug for DataController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataController")
            .field("entity_type", &self.descriptor.entity_type)
            .field("page_index", &self.page_index)
            .field("page_size", &self.page_size)
            .field("total", &self.total)
            .field("state", &self.state)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> DataController<E> {
    pub fn new(config: &ScreenConfig) -> Self {
        Self {
            descriptor: FieldMetadataIndex::global().describe::<E>(),
            registry: PredicateRegistry::with_policy(config.fragment_failure_policy),
            extensions: BTreeMap::new(),
            filter_text: String::new(),
            search_enabled: config.search_enabled,
            sort: Vec::new(),
            default_sort: config.default_sort.clone(),
            page_index: 0,
            target_page: 0,
            page_size: config.page_size.max(1),
            display_truncate: config.display_truncate,
            total: 0,
            rows: Vec::new(),
            state: LoadState::Idle,
            last_error: None,
            seq: 0,
        }
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PredicateRegistry {
        &mut self.registry
    }

    /// Snapshot the current filter, sort and window for a new load.
    ///
    /// Fails only under the fail-fast fragment policy.
    pub fn prepare_load(&mut self) -> Result<LoadRequest<E>, ScreenError> {
        self.sync_search_fragment();
        for (key, fragment) in &self.extensions {
            self.registry.put(key.clone(), fragment.clone());
        }
        let ctx = FilterContext::new(self.descriptor.entity_type.clone());
        let predicate = self.registry.build(&ctx)?;

        self.seq += 1;
        self.state = LoadState::Loading;
        Ok(LoadRequest {
            seq: self.seq,
            page_index: self.target_page,
            page_size: self.page_size,
            predicate,
            sort: self.effective_sort(),
            entity_type: self.descriptor.entity_type.clone(),
            _entity: PhantomData,
        })
    }

    /// Install a response. Returns `Ok(false)` when a newer load was issued
    /// after this one; the response is dropped.
    ///
    /// On failure the previous rows stay and the error is kept for display.
    pub fn apply(&mut self, response: LoadResponse<E>) -> Result<bool, StoreError> {
        if response.seq != self.seq {
            tracing::debug!(
                entity_type = %self.descriptor.entity_type,
                seq = response.seq,
                latest = self.seq,
                "Stale load response dropped"
            );
            return Ok(false);
        }
        match response.outcome {
            Ok(page) => {
                self.page_index = page.page_index;
                self.target_page = page.page_index;
                self.total = page.total;
                self.rows = page.rows;
                self.state = LoadState::Idle;
                self.last_error = None;
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(
                    entity_type = %self.descriptor.entity_type,
                    seq = response.seq,
                    error = %err,
                    "Load failed, keeping previous page"
                );
                self.state = LoadState::Error;
                self.target_page = self.page_index;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub async fn refresh<S>(&mut self, store: &S) -> ScreenResult<()>
    where
        S: EntityStore<E> + ?Sized,
    {
        let request = match self.prepare_load() {
            Ok(request) => request,
            Err(err) => {
                self.target_page = self.page_index;
                return Err(err);
            }
        };
        let response = request.execute(store).await;
        self.apply(response)?;
        Ok(())
    }

    /// Jump to page `n`, clamped to the last page once the count is known.
    pub async fn goto_page<S>(&mut self, store: &S, n: u64) -> ScreenResult<()>
    where
        S: EntityStore<E> + ?Sized,
    {
        self.target_page = n;
        self.refresh(store).await
    }

    /// No-op on the last page.
    pub async fn next_page<S>(&mut self, store: &S) -> ScreenResult<()>
    where
        S: EntityStore<E> + ?Sized,
    {
        if self.page_index + 1 < self.total_pages() {
            self.goto_page(store, self.page_index + 1).await?;
        }
        Ok(())
    }

    /// No-op on the first page.
    pub async fn previous_page<S>(&mut self, store: &S) -> ScreenResult<()>
    where
        S: EntityStore<E> + ?Sized,
    {
        if self.page_index > 0 {
            self.goto_page(store, self.page_index - 1).await?;
        }
        Ok(())
    }

    /// Offset/limit load for scrolling grids: page is `offset / limit`.
    pub async fn load_chunk<S>(&mut self, store: &S, request: ChunkRequest) -> ScreenResult<Vec<E>>
    where
        S: EntityStore<E> + ?Sized,
    {
        if request.limit == 0 {
            return Err(StoreError::InvalidWindow {
                reason: "limit must be > 0".to_string(),
            }
            .into());
        }
        if let Some(text) = request.filter_text {
            self.filter_text = text;
        }
        self.set_sort(request.sort);
        self.page_size = request.limit;
        self.goto_page(store, request.offset / request.limit).await?;
        Ok(self.rows.clone())
    }

    /// Raw search text, applied on the next load. Starts over at page 0.
    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.target_page = 0;
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Column sort. Unknown and unsortable fields are dropped.
    pub fn set_sort(&mut self, orders: Vec<SortOrder>) {
        let descriptor = Arc::clone(&self.descriptor);
        self.sort = orders
            .into_iter()
            .filter(|order| match descriptor.field(&order.field) {
                Some(field) if field.sortable => true,
                _ => {
                    tracing::warn!(
                        entity_type = %descriptor.entity_type,
                        field = %order.field,
                        "Sort on unknown or unsortable field ignored"
                    );
                    false
                }
            })
            .collect();
    }

    /// The sort sent to the store: column sort, else the configured default,
    /// else identity descending.
    pub fn effective_sort(&self) -> Vec<SortOrder> {
        if !self.sort.is_empty() {
            return self.sort.clone();
        }
        if let Some(sort) = &self.default_sort {
            return vec![sort.clone()];
        }
        self.descriptor
            .identity_field()
            .map(|id| vec![SortOrder::desc(id.name.clone())])
            .unwrap_or_default()
    }

    /// Replace the default sort used when no column sort is active.
    pub fn set_default_sort(&mut self, sort: Option<SortOrder>) {
        self.default_sort = sort;
    }

    pub fn set_page_size(&mut self, page_size: u64) -> ScreenResult<()> {
        if page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                value: page_size.to_string(),
                reason: "must be > 0".to_string(),
            }
            .into());
        }
        self.page_size = page_size;
        self.target_page = 0;
        Ok(())
    }

    /// Add a fragment that is put back after every filter reset.
    pub fn extend_predicate(&mut self, key: impl Into<String>, fragment: impl Into<Fragment>) {
        let key = key.into();
        let fragment = fragment.into();
        self.registry.put(key.clone(), fragment.clone());
        self.extensions.insert(key, fragment);
    }

    /// Drop every non-permanent fragment and the search text. Extensions come
    /// back on the next load.
    pub fn reset_filters(&mut self) {
        self.registry.reset();
        self.filter_text.clear();
        self.target_page = 0;
    }

    /// Forget the loaded rows without touching filters.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
        self.total = 0;
        self.page_index = 0;
        self.target_page = 0;
    }

    fn sync_search_fragment(&mut self) {
        let needle = self.filter_text.trim();
        if !self.search_enabled || needle.is_empty() {
            self.registry.remove(SEARCH_KEY);
            return;
        }
        let parts: Vec<Predicate> = self
            .descriptor
            .searchable_fields()
            .map(|field| Predicate::contains(field.name.clone(), needle))
            .collect();
        if parts.is_empty() {
            self.registry.remove(SEARCH_KEY);
            return;
        }
        self.registry.put(SEARCH_KEY, Predicate::or_any(parts));
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        page_count(self.total, self.page_size)
    }

    /// "Page X of Y". An empty result reads "Page 1 of 0".
    pub fn page_info(&self) -> String {
        let pages = self.total_pages();
        let current = (self.page_index + 1).min(pages.max(1));
        format!("Page {current} of {pages}")
    }

    pub fn rows(&self) -> &[E] {
        &self.rows
    }

    pub fn row_identities(&self) -> Vec<Identity> {
        self.rows.iter().filter_map(|row| row.identity()).collect()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    pub fn columns(&self) -> Vec<Column> {
        self.descriptor
            .fields
            .iter()
            .filter(|f| f.kind.is_displayable())
            .map(|f| Column {
                field: f.name.clone(),
                title: f.display_name.clone(),
                sortable: f.sortable,
                frozen: f.frozen,
            })
            .collect()
    }

    /// Display cells of the loaded rows, in column order.
    pub fn grid_rows(&self) -> Vec<GridRow> {
        let columns = self.columns();
        self.rows
            .iter()
            .map(|row| GridRow {
                identity: row.identity(),
                cells: columns
                    .iter()
                    .map(|c| {
                        row.get(&c.field)
                            .unwrap_or(Value::Null)
                            .display_text(self.display_truncate)
                    })
                    .collect(),
            })
            .collect()
    }

    /// Label/value pairs for one entity. Blank values show the declared
    /// default instead.
    pub fn detail_rows(&self, entity: &E) -> Vec<DetailRow> {
        self.descriptor
            .fields
            .iter()
            .filter(|f| f.kind.is_displayable())
            .map(|f| {
                let value = entity.get(&f.name).unwrap_or(Value::Null);
                let shown = match (&f.default_value, value.is_empty()) {
                    (Some(default), true) => default.clone(),
                    _ => value,
                };
                DetailRow {
                    label: f.display_name.clone(),
                    value: shown.display_text(usize::MAX),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_test_utils::{fixtures, Echo, StoreOp};

    fn controller() -> DataController<Echo> {
        DataController::new(&ScreenConfig::default())
    }

    #[tokio::test]
    async fn test_paging_23_rows() {
        let store = fixtures::seeded_store(23);
        let mut ctl = controller();
        ctl.refresh(&store).await.unwrap();
        assert_eq!(ctl.total_pages(), 3);
        assert_eq!(ctl.rows().len(), 10);

        ctl.goto_page(&store, 2).await.unwrap();
        assert_eq!(ctl.rows().len(), 3);

        ctl.goto_page(&store, 5).await.unwrap();
        assert_eq!(ctl.page_index(), 2);
        assert_eq!(ctl.page_info(), "Page 3 of 3");
    }

    #[tokio::test]
    async fn test_empty_store_reads_page_1_of_0() {
        let store = fixtures::seeded_store(0);
        let mut ctl = controller();
        ctl.goto_page(&store, 4).await.unwrap();
        assert_eq!(ctl.page_index(), 0);
        assert!(ctl.rows().is_empty());
        assert_eq!(ctl.page_info(), "Page 1 of 0");
        // Nothing to fetch once the count is zero.
        assert_eq!(store.page_calls(), 0);
    }

    #[tokio::test]
    async fn test_next_and_previous_stay_in_bounds() {
        let store = fixtures::seeded_store(15);
        let mut ctl = controller();
        ctl.refresh(&store).await.unwrap();
        ctl.previous_page(&store).await.unwrap();
        assert_eq!(ctl.page_index(), 0);
        ctl.next_page(&store).await.unwrap();
        ctl.next_page(&store).await.unwrap();
        assert_eq!(ctl.page_index(), 1);
    }

    #[tokio::test]
    async fn test_default_sort_is_identity_descending() {
        let store = fixtures::seeded_store(12);
        let mut ctl = controller();
        ctl.refresh(&store).await.unwrap();
        assert_eq!(ctl.rows()[0].id, Some(12));
        assert_eq!(ctl.effective_sort(), vec![SortOrder::desc("id")]);
    }

    #[test]
    fn test_unsortable_and_unknown_sorts_dropped() {
        let mut ctl = controller();
        ctl.set_sort(vec![
            SortOrder::asc("keywords"),
            SortOrder::asc("ghost"),
            SortOrder::asc("name"),
        ]);
        assert_eq!(ctl.effective_sort(), vec![SortOrder::asc("name")]);
    }

    #[test]
    fn test_blank_search_removes_fragment() {
        let mut ctl = controller();
        ctl.set_filter_text("red");
        ctl.prepare_load().unwrap();
        assert!(ctl.registry().contains(SEARCH_KEY));

        ctl.set_filter_text("   ");
        ctl.prepare_load().unwrap();
        assert!(!ctl.registry().contains(SEARCH_KEY));
    }

    #[tokio::test]
    async fn test_stale_response_dropped() {
        let store = fixtures::seeded_store(5);
        let mut ctl = controller();

        let first = ctl.prepare_load().unwrap();
        ctl.set_filter_text("echo-03");
        let second = ctl.prepare_load().unwrap();
        assert!(second.seq() > first.seq());

        let newer = second.execute(&store).await;
        let older = first.execute(&store).await;
        assert!(ctl.apply(newer).unwrap());
        assert!(!ctl.apply(older).unwrap());
        assert_eq!(ctl.total(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_rows() {
        let store = fixtures::seeded_store(5);
        let mut ctl = controller();
        ctl.refresh(&store).await.unwrap();

        store.fail_next(StoreOp::Count);
        let err = ctl.refresh(&store).await.unwrap_err();
        assert!(matches!(err, ScreenError::Store(StoreError::CountFailed { .. })));
        assert_eq!(ctl.state(), LoadState::Error);
        assert_eq!(ctl.rows().len(), 5);
        assert!(ctl.last_error().is_some());

        ctl.refresh(&store).await.unwrap();
        assert_eq!(ctl.state(), LoadState::Idle);
        assert!(ctl.last_error().is_none());
    }

    #[tokio::test]
    async fn test_load_chunk_maps_offset_to_page() {
        let store = fixtures::seeded_store(30);
        let mut ctl = controller();
        let rows = ctl
            .load_chunk(
                &store,
                ChunkRequest {
                    offset: 10,
                    limit: 5,
                    filter_text: None,
                    sort: vec![SortOrder::asc("id")],
                },
            )
            .await
            .unwrap();
        assert_eq!(ctl.page_index(), 2);
        let ids: Vec<_> = rows.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(11), Some(12), Some(13), Some(14), Some(15)]);
    }

    #[tokio::test]
    async fn test_load_chunk_rejects_zero_limit() {
        let store = fixtures::seeded_store(3);
        let mut ctl = controller();
        let err = ctl
            .load_chunk(&store, ChunkRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScreenError::Store(StoreError::InvalidWindow { .. })));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut ctl = controller();
        assert!(ctl.set_page_size(0).is_err());
        assert_eq!(ctl.page_size(), 10);
    }

    #[tokio::test]
    async fn test_extension_survives_reset() {
        let store = fixtures::seeded_store(10);
        let mut ctl = controller();
        ctl.extend_predicate("small", Predicate::compare("count", tabula_core::CompareOp::Lt, 3i64));
        ctl.reset_filters();
        assert!(!ctl.registry().contains("small"));
        ctl.refresh(&store).await.unwrap();
        assert!(ctl.registry().contains("small"));
        assert_eq!(ctl.total(), 3);
    }

    fn broken_fragment() -> Fragment {
        Fragment::new(|_ctx| {
            Err(tabula_core::FilterError::InvalidValue {
                field: "count".to_string(),
                reason: "not a number".to_string(),
            })
        })
    }

    #[tokio::test]
    async fn test_fail_fast_fragment_aborts_load() {
        let store = fixtures::seeded_store(15);
        let config = ScreenConfig {
            fragment_failure_policy: tabula_core::FragmentFailurePolicy::FailFast,
            ..ScreenConfig::default()
        };
        let mut ctl: DataController<Echo> = DataController::new(&config);
        ctl.refresh(&store).await.unwrap();

        ctl.registry_mut().put("broken", broken_fragment());
        let err = ctl.prepare_load().unwrap_err();
        assert!(matches!(
            err,
            ScreenError::Filter(tabula_core::FilterError::FragmentFailed { ref key, .. }) if key == "broken"
        ));

        let err = ctl.goto_page(&store, 1).await.unwrap_err();
        assert!(matches!(err, ScreenError::Filter(_)));
        assert_eq!(ctl.page_index(), 0);
        assert_eq!(ctl.rows().len(), 10);
        assert_eq!(store.count_calls(), 1);
    }

    #[tokio::test]
    async fn test_degrade_skips_failing_fragment() {
        let store = fixtures::seeded_store(15);
        let mut ctl = controller();
        ctl.registry_mut().put("broken", broken_fragment());
        ctl.registry_mut()
            .put("small", Predicate::compare("count", tabula_core::CompareOp::Lt, 4i64));
        ctl.refresh(&store).await.unwrap();
        assert_eq!(ctl.total(), 4);
    }

    #[tokio::test]
    async fn test_grid_and_detail_rows() {
        let mut echo = Echo::new("a very long echo name that keeps going", 2);
        echo.keywords = vec!["x".to_string(), "y".to_string()];
        let store = fixtures::store_with(vec![echo]);
        let mut ctl = controller();
        ctl.refresh(&store).await.unwrap();

        let columns = ctl.columns();
        let name_col = columns.iter().position(|c| c.field == "name").unwrap();
        let note_col = columns.iter().position(|c| c.field == "note").unwrap();
        let kw_col = columns.iter().position(|c| c.field == "keywords").unwrap();
        let rows = ctl.grid_rows();
        assert_eq!(rows[0].identity, Some(Identity::Int(1)));
        assert_eq!(rows[0].cells[name_col].chars().count(), 25);
        assert!(rows[0].cells[name_col].starts_with("a very long"));
        assert_eq!(rows[0].cells[note_col], "-");
        assert_eq!(rows[0].cells[kw_col], "x, y");

        let details = ctl.detail_rows(&ctl.rows()[0]);
        let status = details.iter().find(|d| d.label == "Status").unwrap();
        // Unset status falls back to the declared default.
        assert_eq!(status.value, "NORMAL");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use tabula_test_utils::{fixtures, Echo};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_goto_page_clamps(rows in 0usize..60, size in 1u64..15, target in 0u64..20) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = fixtures::seeded_store(rows);
            let mut ctl: DataController<Echo> = DataController::new(&ScreenConfig::default());
            ctl.set_page_size(size).unwrap();
            runtime.block_on(ctl.goto_page(&store, target)).unwrap();

            let pages = (rows as u64).div_ceil(size);
            prop_assert_eq!(ctl.total_pages(), pages);
            prop_assert_eq!(ctl.page_index(), target.min(pages.saturating_sub(1)));
            let expected = if pages == 0 {
                0
            } else {
                (rows as u64 - ctl.page_index() * size).min(size)
            };
            prop_assert_eq!(ctl.rows().len() as u64, expected);
        }
    }
}
