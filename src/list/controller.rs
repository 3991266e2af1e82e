//! The list controller
//!
//! Owns the items, the draft buffer and the edit state. Every operation is
//! synchronous and total: bad input and unknown ids are ignored, storage
//! failures are logged and the in-memory list stays authoritative.

use std::collections::HashSet;

use super::item::{Item, ItemId, decode_items, encode_items};
use super::observer::{Change, Observers, Snapshot, SubscriptionId};
use crate::persistence::{PersistentStore, StorageError};
use crate::platform::{Clock, Confirm, SystemClock};
use crate::settings::Settings;

/// Per-item intent forwarded by a front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Toggle,
    Edit,
    Delete,
}

impl ItemAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemAction::Toggle => "toggle",
            ItemAction::Edit => "edit",
            ItemAction::Delete => "delete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "toggle" => Some(ItemAction::Toggle),
            "edit" => Some(ItemAction::Edit),
            "delete" => Some(ItemAction::Delete),
            _ => None,
        }
    }
}

/// Todo list state plus its persistence
pub struct TodoList<S: PersistentStore, C: Clock = SystemClock> {
    items: Vec<Item>,
    draft: String,
    editing: Option<ItemId>,
    store: S,
    clock: C,
    storage_key: String,
    clear_prompt: String,
    observers: Observers,
}

impl<S: PersistentStore> TodoList<S, SystemClock> {
    /// Create a controller on the wall clock and rehydrate from `store`
    pub fn new(store: S, settings: &Settings) -> Self {
        Self::with_clock(store, SystemClock, settings)
    }
}

impl<S: PersistentStore, C: Clock> TodoList<S, C> {
    /// Create a controller with an explicit clock and rehydrate from `store`
    pub fn with_clock(store: S, clock: C, settings: &Settings) -> Self {
        let mut list = Self {
            items: Vec::new(),
            draft: String::new(),
            editing: None,
            store,
            clock,
            storage_key: settings.storage_key.clone(),
            clear_prompt: settings.clear_prompt.clone(),
            observers: Observers::default(),
        };
        list.rehydrate();
        list
    }

    /// Replace in-memory state with the stored snapshot. Missing or
    /// unparsable data yields an empty list.
    pub fn rehydrate(&mut self) {
        self.items = match self.store.load(&self.storage_key) {
            Ok(Some(json)) => match decode_items(&json) {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("Discarding stored list '{}': {}", self.storage_key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Could not read list '{}': {}", self.storage_key, e);
                Vec::new()
            }
        };
        self.editing = None;
        self.draft.clear();

        log::info!("Rehydrated {} items", self.items.len());
        self.emit(Change::Rehydrated);
    }

    /// Prepend a new item. Whitespace-only text is ignored.
    pub fn add(&mut self, text: &str) -> Option<ItemId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let id = self.next_id();
        self.items.insert(0, Item::new(id, text));
        self.draft.clear();
        log::debug!("Added item {}", id);

        self.persist();
        self.emit(Change::Added(id));
        Some(id)
    }

    /// Remove an item. Returns whether anything was removed.
    pub fn delete(&mut self, id: ItemId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.items.remove(pos);
        log::debug!("Deleted item {}", id);

        let was_editing = self.editing == Some(id);
        if was_editing {
            self.editing = None;
            self.draft.clear();
        }

        self.persist();
        self.emit(Change::Removed(id));
        if was_editing {
            self.emit(Change::EditEnded);
        }
        true
    }

    /// Enter edit mode for `id`, loading its text into the draft
    pub fn begin_edit(&mut self, id: ItemId) -> bool {
        let Some(text) = self.get(id).map(|item| item.text.clone()) else {
            return false;
        };
        self.draft = text;
        self.editing = Some(id);

        self.emit(Change::EditStarted(id));
        true
    }

    /// Replace the draft buffer
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.emit(Change::DraftChanged);
    }

    /// Apply the draft to the item being edited and leave edit mode.
    /// An empty draft leaves the text untouched. Returns whether the item
    /// text was replaced.
    pub fn commit_edit(&mut self) -> bool {
        let Some(id) = self.editing.take() else {
            return false;
        };
        let draft = std::mem::take(&mut self.draft);
        let text = draft.trim();

        let mut updated = false;
        if text.is_empty() {
            log::debug!("Empty edit for item {} dropped", id);
        } else if let Some(pos) = self.position(id) {
            self.items[pos].text = text.to_string();
            updated = true;
        }

        if updated {
            log::debug!("Updated item {}", id);
            self.persist();
            self.emit(Change::Updated(id));
        }
        self.emit(Change::EditEnded);
        updated
    }

    /// Leave edit mode without touching the item
    pub fn cancel_edit(&mut self) {
        if self.editing.take().is_some() {
            self.draft.clear();
            self.emit(Change::EditEnded);
        }
    }

    /// Flip the completed flag. Returns the new value, `None` if absent.
    pub fn toggle_complete(&mut self, id: ItemId) -> Option<bool> {
        let pos = self.position(id)?;
        let item = &mut self.items[pos];
        item.completed = !item.completed;
        let completed = item.completed;
        log::debug!("Item {} completed = {}", id, completed);

        self.persist();
        self.emit(Change::Toggled(id));
        Some(completed)
    }

    /// Empty the list once `confirm` agrees. Returns whether it was cleared.
    pub fn clear_all(&mut self, confirm: &mut impl Confirm) -> bool {
        if !confirm.confirm(&self.clear_prompt) {
            log::debug!("Clear all declined");
            return false;
        }

        let removed = self.items.len();
        self.items.clear();
        self.editing = None;
        self.draft.clear();
        log::info!("Cleared {} items", removed);

        self.persist();
        self.emit(Change::Cleared);
        true
    }

    /// Run a per-item action. Returns whether the item existed.
    pub fn apply(&mut self, action: ItemAction, id: ItemId) -> bool {
        match action {
            ItemAction::Toggle => self.toggle_complete(id).is_some(),
            ItemAction::Edit => self.begin_edit(id),
            ItemAction::Delete => self.delete(id),
        }
    }

    /// Register a change listener
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&Change, &Snapshot<'_>) + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(Box::new(callback))
    }

    /// Drop a change listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Flush the final snapshot, drop listeners and hand back the store
    pub fn shutdown(mut self) -> S {
        self.persist();
        self.observers.clear();
        log::info!("List shut down with {} items", self.items.len());
        self.store
    }

    // === Accessors ===

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn editing(&self) -> Option<ItemId> {
        self.editing
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items not yet completed
    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            items: &self.items,
            draft: &self.draft,
            editing: self.editing,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // === Internals ===

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Current time, bumped past the newest id if the clock has not moved.
    /// With no headroom above the newest id, the first free id at or after
    /// `now` (wrapping) is used.
    fn next_id(&self) -> ItemId {
        let now = self.clock.now_ms();
        let Some(max) = self.items.iter().map(|item| item.id.0).max() else {
            return ItemId(now);
        };
        if now > max {
            return ItemId(now);
        }
        if let Some(next) = max.checked_add(1) {
            return ItemId(next);
        }

        let taken: HashSet<i64> = self.items.iter().map(|item| item.id.0).collect();
        (now..=i64::MAX)
            .chain(i64::MIN..now)
            .find(|candidate| !taken.contains(candidate))
            .map(ItemId)
            .unwrap_or(ItemId(now))
    }

    fn write_snapshot(&mut self) -> Result<(), StorageError> {
        let json = encode_items(&self.items)?;
        self.store.save(&self.storage_key, &json)
    }

    fn persist(&mut self) {
        if let Err(e) = self.write_snapshot() {
            log::warn!("Failed to save list '{}': {}", self.storage_key, e);
        }
    }

    fn emit(&mut self, change: Change) {
        let snapshot = Snapshot {
            items: &self.items,
            draft: &self.draft,
            editing: self.editing,
        };
        self.observers.notify(&change, &snapshot);
    }
}
