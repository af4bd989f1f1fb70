// Bookmark list - no Tauri imports allowed.
// Held in process memory for the lifetime of the shell; edits do not
// survive exit. Both the settings surface and the toolbar observe the
// same list through the shared handle, so every mutation notifies.

use serde::{Deserialize, Serialize};

use crate::modules::address;
use crate::modules::observe::{Observers, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkEntry {
    pub name: String,
    pub address: String,
}

pub struct BookmarkList {
    entries: Vec<BookmarkEntry>,
    observers: Observers<[BookmarkEntry]>,
}

impl BookmarkList {
    pub fn new() -> Self {
        BookmarkList {
            entries: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Seed the list, e.g. from configuration defaults at startup.
    pub fn with_entries(entries: Vec<BookmarkEntry>) -> Self {
        BookmarkList {
            entries,
            observers: Observers::new(),
        }
    }

    pub fn entries(&self) -> &[BookmarkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(
        &mut self,
        f: impl Fn(&[BookmarkEntry]) + Send + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Append `address` with a derived default name. Rejected as a no-op
    /// when the address is empty or already present verbatim; returns
    /// whether an entry was appended.
    pub fn add(&mut self, address: &str) -> bool {
        if address.is_empty() || self.entries.iter().any(|e| e.address == address) {
            return false;
        }
        let name = address::derive_bookmark_name(address, self.entries.len() + 1);
        self.entries.push(BookmarkEntry {
            name,
            address: address.to_string(),
        });
        self.observers.notify(&self.entries);
        true
    }

    /// Replace the display name at `index`. Names need not be unique.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range. Only the UI mutates the list,
    /// so an out-of-range index is a programming error, not user input.
    pub fn rename(&mut self, index: usize, new_name: &str) {
        self.entries[index].name = new_name.to_string();
        self.observers.notify(&self.entries);
    }

    /// Delete the entry at `index`, shifting subsequent entries up.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range, same as [`Self::rename`].
    pub fn remove(&mut self, index: usize) -> BookmarkEntry {
        let removed = self.entries.remove(index);
        self.observers.notify(&self.entries);
        removed
    }
}

impl Default for BookmarkList {
    fn default() -> Self {
        Self::new()
    }
}
