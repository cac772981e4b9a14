use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{entry_key, DirectoryStore, Entry, StoreError, Version};

/// In-memory directory store using a HashMap
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectoryStore {
    inner: Arc<RwLock<MemoryDirectoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryDirectoryStoreInner {
    /// entry key -> (content, generation)
    entries: HashMap<String, (Bytes, u64)>,
    /// Source of generations; never reused, even across deletes
    next_generation: u64,
}

impl MemoryDirectoryStoreInner {
    fn put(&mut self, key: String, content: Bytes) -> Version {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.entries.insert(key, (content, generation));
        Version::from_e_tag(generation.to_string())
    }
}

impl MemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryDirectoryStoreInner>, StoreError> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("failed to acquire read lock: {}", e)))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, MemoryDirectoryStoreInner>, StoreError> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn lookup(&self, directory: &str, name: &str) -> Result<Option<Entry>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .entries
            .get(&entry_key(directory, name))
            .map(|(content, generation)| Entry {
                content: content.clone(),
                version: Version::from_e_tag(generation.to_string()),
            }))
    }

    async fn create(
        &self,
        directory: &str,
        name: &str,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        let key = entry_key(directory, name);
        let mut inner = self.write()?;
        if inner.entries.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        Ok(inner.put(key, content))
    }

    async fn update(
        &self,
        directory: &str,
        name: &str,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        let key = entry_key(directory, name);
        let mut inner = self.write()?;
        if !inner.entries.contains_key(&key) {
            return Err(StoreError::NotFound(key));
        }
        Ok(inner.put(key, content))
    }

    async fn update_if_unchanged(
        &self,
        directory: &str,
        name: &str,
        expected: &Version,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        let key = entry_key(directory, name);
        let mut inner = self.write()?;
        let current = match inner.entries.get(&key) {
            Some((_, generation)) => Version::from_e_tag(generation.to_string()),
            None => return Err(StoreError::NotFound(key)),
        };
        if &current != expected {
            return Err(StoreError::Conflict(key));
        }
        Ok(inner.put(key, content))
    }

    async fn delete(&self, directory: &str, name: &str) -> Result<(), StoreError> {
        let key = entry_key(directory, name);
        let mut inner = self.write()?;
        match inner.entries.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key)),
        }
    }
}
