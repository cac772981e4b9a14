//! Fault injection around a [`DirectoryStore`] for exercising the
//! provisioner's failure and retry paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::store::{DirectoryStore, Entry, MemoryDirectoryStore, StoreError, Version};

/// Wraps a store and injects failures on demand.
#[derive(Clone)]
pub struct FaultyStore<S = MemoryDirectoryStore> {
    inner: S,
    state: Arc<FaultState>,
}

#[derive(Default)]
struct FaultState {
    unavailable_lookups: AtomicUsize,
    unavailable_writes: AtomicUsize,
    conflicting_updates: AtomicUsize,
    vanishing_updates: AtomicUsize,
    lookups: AtomicUsize,
    writes: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl<S> std::fmt::Debug for FaultyStore<S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultyStore")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl FaultyStore<MemoryDirectoryStore> {
    pub fn memory() -> Self {
        Self::new(MemoryDirectoryStore::new())
    }
}

impl<S: DirectoryStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            state: Arc::new(FaultState::default()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The next `n` lookups fail with [`StoreError::Unavailable`].
    pub fn fail_lookups(&self, n: usize) {
        self.state.unavailable_lookups.store(n, Ordering::SeqCst);
    }

    /// The next `n` create/update/delete calls fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, n: usize) {
        self.state.unavailable_writes.store(n, Ordering::SeqCst);
    }

    /// The next `n` conditional updates and creates lose a race.
    pub fn conflict_updates(&self, n: usize) {
        self.state.conflicting_updates.store(n, Ordering::SeqCst);
    }

    /// The next `n` conditional updates find the entry deleted.
    pub fn vanish_updates(&self, n: usize) {
        self.state.vanishing_updates.store(n, Ordering::SeqCst);
    }

    /// Delay every call by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.state.delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    /// Number of lookups served (including injected failures)
    pub fn lookups(&self) -> usize {
        self.state.lookups.load(Ordering::SeqCst)
    }

    /// Number of write calls attempted (including injected failures)
    pub fn writes(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.state.delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn before_write(&self) -> Result<(), StoreError> {
        self.pause().await;
        self.state.writes.fetch_add(1, Ordering::SeqCst);
        if Self::take(&self.state.unavailable_writes) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: DirectoryStore> DirectoryStore for FaultyStore<S> {
    async fn lookup(&self, directory: &str, name: &str) -> Result<Option<Entry>, StoreError> {
        self.pause().await;
        self.state.lookups.fetch_add(1, Ordering::SeqCst);
        if Self::take(&self.state.unavailable_lookups) {
            return Err(StoreError::Unavailable("injected lookup failure".into()));
        }
        self.inner.lookup(directory, name).await
    }

    async fn create(
        &self,
        directory: &str,
        name: &str,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        self.before_write().await?;
        if Self::take(&self.state.conflicting_updates) {
            return Err(StoreError::AlreadyExists("injected create race".into()));
        }
        self.inner.create(directory, name, content).await
    }

    async fn update(
        &self,
        directory: &str,
        name: &str,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        self.before_write().await?;
        self.inner.update(directory, name, content).await
    }

    async fn update_if_unchanged(
        &self,
        directory: &str,
        name: &str,
        expected: &Version,
        content: Bytes,
    ) -> Result<Version, StoreError> {
        self.before_write().await?;
        if Self::take(&self.state.vanishing_updates) {
            return Err(StoreError::NotFound("injected vanish".into()));
        }
        if Self::take(&self.state.conflicting_updates) {
            return Err(StoreError::Conflict("injected conflict".into()));
        }
        self.inner
            .update_if_unchanged(directory, name, expected, content)
            .await
    }

    async fn delete(&self, directory: &str, name: &str) -> Result<(), StoreError> {
        self.before_write().await?;
        self.inner.delete(directory, name).await
    }
}
