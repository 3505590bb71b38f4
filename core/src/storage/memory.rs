use crate::error::CoreResult;
use crate::storage::store::StoreAdapter;
use std::collections::BTreeMap;

/// In-memory store, used by tests and as a scratch store when no directory
/// is available.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StoreAdapter for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
