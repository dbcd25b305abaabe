use std::collections::HashMap;

use crate::{handle::LoadHandle, key_id::KeyId};

/// Maps each requested `KeyId` to its shared result handle.
///
/// Entries are inserted once, on the first load of a `KeyId`, and live as long as the cache.
/// There is intentionally no removal: a settled entry (including a failed one) is reused by
/// every later load of the same `KeyId`.
pub struct ResultCache<V, E> {
    entries: HashMap<KeyId, LoadHandle<V, E>>,
}

impl<V, E> ResultCache<V, E> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn get(&self, id: &KeyId) -> Option<&LoadHandle<V, E>> {
        self.entries.get(id)
    }

    /// Inserts the handle for a `KeyId` that has not been requested before.
    pub fn insert(&mut self, id: KeyId, handle: LoadHandle<V, E>) {
        debug_assert!(!self.entries.contains_key(&id), "cache entry for {} replaced", id);
        self.entries.insert(id, handle);
    }
}

impl<V, E> Default for ResultCache<V, E> {
    fn default() -> Self {
        Self::new()
    }
}
