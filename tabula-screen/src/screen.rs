//! Entity selection screen.
//!
//! Wraps a [`DataController`] and a [`SelectionTracker`] around one store,
//! and adds the filter workflow of a picker dialog: exact id search, custom
//! filter widgets, permanent filters, and finish/cancel. Rows are edited
//! through forms built with the screen's field initialization setting.

use crate::config::ScreenConfig;
use crate::controller::DataController;
use crate::error::{ScreenError, ScreenResult};
use crate::notifications::Notification;
use crate::selection::{SelectionMode, SelectionTracker};
use std::collections::VecDeque;
use std::sync::Arc;
use tabula_core::{
    Entity, FieldDescriptor, Fragment, Identity, Predicate, PredicateRegistry, SortOrder, INIT_KEY,
};
use tabula_forms::{FieldSurface, FormBindingEngine, FormError, FormResult};
use tabula_storage::EntityStore;

/// Registry key of the exact id search fragment.
pub const ID_SEARCH_KEY: &str = "idSearch";

/// Pending notifications kept before the oldest are dropped.
pub const MAX_NOTIFICATIONS: usize = 20;

/// A filter widget that contributes fragments to the registry.
pub trait CustomFilter: Send {
    /// Put this filter's fragments into `registry`.
    fn apply(&self, registry: &mut PredicateRegistry);

    /// Reset the widget's own input.
    fn clear(&mut self);
}

pub struct EntityScreen<E: Entity, S: EntityStore<E> + ?Sized> {
    store: Arc<S>,
    controller: DataController<E>,
    selection: SelectionTracker,
    selection_mode: SelectionMode,
    id_search: String,
    focus_mode: bool,
    custom_filters: Vec<Box<dyn CustomFilter>>,
    checked: Vec<Identity>,
    auto_initialize_fields: bool,
    notifications: VecDeque<Notification>,
}

impl<E: Entity, S: EntityStore<E> + ?Sized> EntityScreen<E, S> {
    /// Rows sort by identity ascending unless the config names a sort.
    pub fn new(store: Arc<S>, config: &ScreenConfig) -> Self {
        let mut controller = DataController::new(config);
        if config.default_sort.is_none() {
            let identity_sort = controller
                .descriptor()
                .identity_field()
                .map(|id| SortOrder::asc(id.name.clone()));
            controller.set_default_sort(identity_sort);
        }
        Self {
            store,
            controller,
            selection: SelectionTracker::new(config.selection_mode),
            selection_mode: config.selection_mode,
            id_search: String::new(),
            focus_mode: false,
            custom_filters: Vec::new(),
            checked: Vec::new(),
            auto_initialize_fields: config.auto_initialize_fields,
            notifications: VecDeque::new(),
        }
    }

    /// Fragment every load carries, surviving every reset.
    pub fn with_init_filter(mut self, fragment: impl Into<Fragment>) -> Self {
        self.controller.registry_mut().put_permanent(INIT_KEY, fragment);
        self
    }

    /// In focus mode the custom filters are always applied and the id search
    /// is ignored.
    pub fn with_focus_mode(mut self, focus_mode: bool) -> Self {
        self.focus_mode = focus_mode;
        self
    }

    pub fn with_custom_filter(mut self, filter: Box<dyn CustomFilter>) -> Self {
        self.custom_filters.push(filter);
        self
    }

    /// First load. Filters are applied up front in focus mode or when an
    /// init filter is present.
    pub async fn open(&mut self) -> ScreenResult<()> {
        if self.focus_mode || self.controller.registry().contains(INIT_KEY) {
            self.apply_filters().await
        } else {
            self.reload().await
        }
    }

    pub fn title(&self) -> String {
        let suffix = match self.selection.mode() {
            SelectionMode::Single => " (single)",
            SelectionMode::Multi => " (multi)",
            SelectionMode::BrowseOnly => "",
        };
        format!("{} select data{}", self.controller.descriptor().entity_type, suffix)
    }

    pub fn set_id_search(&mut self, text: impl Into<String>) {
        self.id_search = text.into();
    }

    pub fn id_search(&self) -> &str {
        &self.id_search
    }

    /// Rebuild the filter from the current inputs and go to page 0.
    ///
    /// Id search text that does not parse as the identity kind adds nothing.
    pub async fn apply_filters(&mut self) -> ScreenResult<()> {
        self.controller.registry_mut().reset();
        if !self.focus_mode {
            self.put_id_search();
        }
        for filter in &self.custom_filters {
            filter.apply(self.controller.registry_mut());
        }
        self.goto_page(0).await
    }

    /// Clear filter inputs and the selection, then go to page 0. Focus mode
    /// keeps its custom filters applied.
    pub async fn reset_filters(&mut self) -> ScreenResult<()> {
        if !self.focus_mode {
            self.id_search.clear();
            for filter in &mut self.custom_filters {
                filter.clear();
            }
        }
        self.controller.reset_filters();
        self.selection.clear();
        if self.focus_mode {
            for filter in &self.custom_filters {
                filter.apply(self.controller.registry_mut());
            }
        }
        self.goto_page(0).await
    }

    /// Filter that survives every reset, applied immediately.
    pub async fn add_permanent_filter(
        &mut self,
        key: impl Into<String>,
        fragment: impl Into<Fragment>,
    ) -> ScreenResult<()> {
        self.controller.registry_mut().put_permanent(key, fragment);
        self.apply_filters().await
    }

    /// Fragment re-added on every load, then refresh.
    pub async fn extend_predicate(
        &mut self,
        key: impl Into<String>,
        fragment: impl Into<Fragment>,
    ) -> ScreenResult<()> {
        self.controller.extend_predicate(key, fragment);
        self.reload().await
    }

    /// Drop rows, id search, non-permanent filters and the selection.
    pub async fn clear(&mut self) -> ScreenResult<()> {
        self.controller.clear_rows();
        self.id_search.clear();
        self.controller.registry_mut().reset();
        self.selection.clear();
        self.checked.clear();
        self.goto_page(0).await
    }

    pub async fn search(&mut self, text: impl Into<String>) -> ScreenResult<()> {
        self.controller.set_filter_text(text);
        self.reload().await
    }

    pub async fn goto_page(&mut self, n: u64) -> ScreenResult<()> {
        let result = self.controller.goto_page(self.store.as_ref(), n).await;
        self.after_load(result)
    }

    pub async fn next_page(&mut self) -> ScreenResult<()> {
        let result = self.controller.next_page(self.store.as_ref()).await;
        self.after_load(result)
    }

    pub async fn previous_page(&mut self) -> ScreenResult<()> {
        let result = self.controller.previous_page(self.store.as_ref()).await;
        self.after_load(result)
    }

    pub async fn reload(&mut self) -> ScreenResult<()> {
        let result = self.controller.refresh(self.store.as_ref()).await;
        self.after_load(result)
    }

    /// Preselect ids chosen elsewhere. They need not be on this page.
    pub fn set_selected(&mut self, ids: Vec<Identity>) {
        self.selection.apply_external_selection(ids);
        self.reconcile();
    }

    /// Grid checkbox changes on the visible page.
    pub fn on_grid_selection(&mut self, added: &[Identity], removed: &[Identity]) {
        self.selection.on_visible_selection_changed(added, removed);
        self.reconcile();
    }

    /// Browse mode shows rows without any selection.
    pub fn set_browse_mode(&mut self, browse: bool) {
        let mode = if browse {
            SelectionMode::BrowseOnly
        } else {
            self.selection_mode
        };
        self.selection.set_mode(mode);
        self.reconcile();
    }

    pub fn is_browse_mode(&self) -> bool {
        self.selection.mode() == SelectionMode::BrowseOnly
    }

    /// Selected identities, or `None` in browse mode.
    pub fn finish(&self) -> Option<Vec<Identity>> {
        let result = self.selection.finish();
        tracing::info!(
            entity_type = %self.controller.descriptor().entity_type,
            selected = result.as_ref().map_or(0, Vec::len),
            "Selection finished"
        );
        result
    }

    pub fn cancel(&mut self) -> Option<Vec<Identity>> {
        self.selection.clear();
        self.checked.clear();
        None
    }

    /// Form over `entity`. With auto-initialize off the bindings mirror the
    /// entity as loaded and no defaults are applied.
    pub fn edit_form<F>(&self, entity: E, surfaces: F) -> FormResult<FormBindingEngine<E>>
    where
        F: FnMut(&FieldDescriptor) -> Box<dyn FieldSurface>,
    {
        let mut form =
            FormBindingEngine::with_surfaces(entity, self.auto_initialize_fields, surfaces)?;
        form.initialize()?;
        Ok(form)
    }

    /// Save `form` through this screen's store, then reload the page so the
    /// grid shows the saved row.
    ///
    /// Store failures are also raised as a notification. Validation errors
    /// stay inline on the form.
    pub async fn save_form(&mut self, form: &mut FormBindingEngine<E>) -> FormResult<Identity> {
        let identity = match form.save(self.store.as_ref()).await {
            Ok(identity) => identity,
            Err(FormError::Store(err)) => {
                let entity_type = self.controller.descriptor().entity_type.clone();
                self.notify(Notification::from_error(
                    entity_type,
                    &ScreenError::Store(err.clone()),
                ));
                return Err(FormError::Store(err));
            }
            Err(err) => return Err(err),
        };
        if let Err(err) = self.reload().await {
            tracing::warn!(identity = %identity, error = %err, "Reload after save failed");
        }
        Ok(identity)
    }

    pub fn controller(&self) -> &DataController<E> {
        &self.controller
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    /// Visible rows to show as checked.
    pub fn checked_rows(&self) -> &[Identity] {
        &self.checked
    }

    /// Pending notifications, oldest first.
    pub fn notifications(&self) -> &VecDeque<Notification> {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn notify(&mut self, notification: Notification) {
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.pop_front();
            tracing::debug!(limit = MAX_NOTIFICATIONS, "Dropped oldest notification");
        }
        self.notifications.push_back(notification);
    }

    fn put_id_search(&mut self) {
        let Some((name, kind)) = self
            .controller
            .descriptor()
            .identity_field()
            .map(|f| (f.name.clone(), f.kind.clone()))
        else {
            return;
        };
        match Identity::parse(&kind, &self.id_search) {
            Some(id) => {
                let predicate = Predicate::equals(name, id.to_value());
                self.controller.registry_mut().put(ID_SEARCH_KEY, predicate);
            }
            None if !self.id_search.trim().is_empty() => {
                tracing::debug!(input = %self.id_search, "Id search ignored, not a valid identity");
            }
            None => {}
        }
    }

    fn after_load(&mut self, result: ScreenResult<()>) -> ScreenResult<()> {
        match result {
            Ok(()) => {
                self.reconcile();
                Ok(())
            }
            Err(err) => {
                let entity_type = self.controller.descriptor().entity_type.clone();
                self.notify(Notification::from_error(entity_type, &err));
                Err(err)
            }
        }
    }

    fn reconcile(&mut self) {
        let rows = self.controller.row_identities();
        self.checked = self.selection.reconcile_for_page(&rows);
    }
}
