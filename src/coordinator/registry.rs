use super::PendingRequest;
use std::collections::HashMap;

/// Mapping from URL to its pending entry. Holds at most one entry per URL.
pub struct RequestRegistry<P> {
    entries: HashMap<String, PendingRequest<P>>,
}

impl<P> Default for RequestRegistry<P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<P> std::fmt::Debug for RequestRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.values()).finish()
    }
}

impl<P> RequestRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, url: &str) -> Option<&PendingRequest<P>> {
        self.entries.get(url)
    }

    pub fn lookup_mut(&mut self, url: &str) -> Option<&mut PendingRequest<P>> {
        self.entries.get_mut(url)
    }

    /// Inserts `entry` under its URL. If an entry for that URL already exists the registry is
    /// left untouched and `entry` is handed back.
    pub fn insert(&mut self, entry: PendingRequest<P>) -> Result<(), PendingRequest<P>> {
        if self.entries.contains_key(entry.url()) {
            return Err(entry);
        }
        self.entries.insert(entry.url().to_string(), entry);
        Ok(())
    }

    /// Removes the entry for `url`. Removing an unknown URL is a no-op.
    pub fn remove(&mut self, url: &str) -> Option<PendingRequest<P>> {
        self.entries.remove(url)
    }

    /// Snapshot of the URLs currently registered
    pub fn urls(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
