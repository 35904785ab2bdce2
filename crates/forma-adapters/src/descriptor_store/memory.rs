//! In-memory descriptor store.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use forma_core::{
    application::{ApplicationError, ports::DescriptorStore},
    domain::{DescriptorLookup, DescriptorRegistry, TemplateDescriptor},
    error::FormaResult,
};
use tracing::debug;

/// Thread-safe in-memory descriptor store.
///
/// Clones share the same map, so a store handed to a service can still be
/// filled by a loader afterwards.
#[derive(Clone, Default)]
pub struct InMemoryDescriptorStore {
    inner: Arc<RwLock<HashMap<String, Arc<TemplateDescriptor>>>>,
}

impl InMemoryDescriptorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `descriptors`. Later duplicates replace earlier ones.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TemplateDescriptor>) -> Self {
        let map = descriptors
            .into_iter()
            .map(|d| (d.identifier.clone(), Arc::new(d)))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Number of descriptors (0 if the lock is poisoned).
    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |inner| inner.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every descriptor.
    pub fn clear(&self) -> FormaResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.clear();
        Ok(())
    }

    /// Point-in-time copy as a registry, for lock-free resolution.
    pub fn snapshot(&self) -> FormaResult<DescriptorRegistry> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner
            .values()
            .map(|d| TemplateDescriptor::clone(d))
            .collect())
    }
}

impl std::fmt::Debug for InMemoryDescriptorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDescriptorStore")
            .field("len", &self.len())
            .finish()
    }
}

impl DescriptorLookup for InMemoryDescriptorStore {
    fn descriptor(&self, identifier: &str) -> Option<Arc<TemplateDescriptor>> {
        self.inner.read().ok()?.get(identifier).cloned()
    }
}

impl DescriptorStore for InMemoryDescriptorStore {
    fn list(&self) -> FormaResult<Vec<Arc<TemplateDescriptor>>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let mut all: Vec<_> = inner.values().cloned().collect();
        all.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(all)
    }

    fn insert(&self, descriptor: TemplateDescriptor) -> FormaResult<Option<Arc<TemplateDescriptor>>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        debug!(identifier = %descriptor.identifier, "storing descriptor");
        Ok(inner.insert(descriptor.identifier.clone(), Arc::new(descriptor)))
    }

    fn remove(&self, identifier: &str) -> FormaResult<Option<Arc<TemplateDescriptor>>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner.remove(identifier))
    }
}
