//! Cross-page selection.
//!
//! The grid only ever shows one page, so it cannot own the selection. The
//! tracker keeps the authoritative identity set and tells the grid which of
//! the visible rows to check after each load. Identities are kept in the
//! order they were selected.

use serde::{Deserialize, Serialize};
use tabula_core::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
    BrowseOnly,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    mode: SelectionMode,
    selected: Vec<Identity>,
    visible: Vec<Identity>,
}

impl SelectionTracker {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: Vec::new(),
            visible: Vec::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch modes. Browse-only drops the selection; narrowing to single
    /// keeps the identity that was selected first.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        match mode {
            SelectionMode::BrowseOnly => self.selected.clear(),
            SelectionMode::Single => self.keep_first(),
            SelectionMode::Multi => {}
        }
    }

    /// Replace the selection with ids chosen outside the grid.
    ///
    /// Ids need not be on any loaded page. Single mode keeps only the first.
    pub fn apply_external_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = Identity>,
    {
        self.selected.clear();
        match self.mode {
            SelectionMode::BrowseOnly => {}
            SelectionMode::Single => {
                let mut ids = ids.into_iter();
                if let Some(first) = ids.next() {
                    let dropped = ids.count();
                    if dropped > 0 {
                        tracing::debug!(kept = %first, dropped, "Single selection narrowed");
                    }
                    self.selected.push(first);
                }
            }
            SelectionMode::Multi => {
                for id in ids {
                    self.select(id);
                }
            }
        }
    }

    /// Apply a grid selection change. Only ids on the visible page count;
    /// single mode replaces whatever was selected before.
    pub fn on_visible_selection_changed(&mut self, added: &[Identity], removed: &[Identity]) {
        if self.mode == SelectionMode::BrowseOnly {
            return;
        }
        let added: Vec<&Identity> = added.iter().filter(|id| self.visible.contains(id)).collect();
        let removed: Vec<&Identity> = removed.iter().filter(|id| self.visible.contains(id)).collect();

        match self.mode {
            SelectionMode::Single => {
                self.selected.retain(|id| !removed.contains(&id));
                if let Some(last) = added.last() {
                    self.selected.clear();
                    self.selected.push((*last).clone());
                }
            }
            SelectionMode::Multi => {
                self.selected.retain(|id| !removed.contains(&id));
                for id in added {
                    self.select(id.clone());
                }
            }
            SelectionMode::BrowseOnly => {}
        }
    }

    /// Record the rows now on screen and return those that should show as
    /// checked, in row order. The selection itself is untouched.
    pub fn reconcile_for_page(&mut self, rows: &[Identity]) -> Vec<Identity> {
        self.visible = rows.to_vec();
        rows.iter()
            .filter(|id| self.selected.contains(id))
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.visible.clear();
    }

    /// Identities to hand back to the caller. `None` while browsing.
    pub fn finish(&self) -> Option<Vec<Identity>> {
        match self.mode {
            SelectionMode::BrowseOnly => None,
            _ => Some(self.selected.iter().cloned().collect()),
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &Identity> {
        self.selected.iter()
    }

    pub fn is_selected(&self, id: &Identity) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    fn select(&mut self, id: Identity) {
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    fn keep_first(&mut self) {
        self.selected.truncate(1);
    }
}
