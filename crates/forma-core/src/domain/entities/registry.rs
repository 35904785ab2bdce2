//! Descriptor arena keyed by identifier.
//!
//! Ancestors are referenced by identifier and looked up on demand, never
//! through object references. That keeps the inheritance graph a plain
//! value graph: cycle detection works on identifier sets, and resolving many
//! targets in parallel only needs shared read access.

use std::collections::HashMap;
use std::sync::Arc;

use super::descriptor::TemplateDescriptor;

/// Lookup capability used by the ancestor resolver.
///
/// Implemented by:
/// - [`DescriptorRegistry`] (in-process arena)
/// - `forma_adapters::InMemoryDescriptorStore` (lock-guarded store)
#[cfg_attr(test, mockall::automock)]
pub trait DescriptorLookup: Send + Sync {
    /// Descriptor registered under `identifier`, if any.
    fn descriptor(&self, identifier: &str) -> Option<Arc<TemplateDescriptor>>;
}

impl<T: DescriptorLookup + ?Sized> DescriptorLookup for Arc<T> {
    fn descriptor(&self, identifier: &str) -> Option<Arc<TemplateDescriptor>> {
        (**self).descriptor(identifier)
    }
}

impl DescriptorLookup for HashMap<String, Arc<TemplateDescriptor>> {
    fn descriptor(&self, identifier: &str) -> Option<Arc<TemplateDescriptor>> {
        self.get(identifier).cloned()
    }
}

/// Immutable-by-convention arena of every known descriptor.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, Arc<TemplateDescriptor>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, returning the one it displaced (same identifier).
    pub fn insert(&mut self, descriptor: TemplateDescriptor) -> Option<Arc<TemplateDescriptor>> {
        self.descriptors
            .insert(descriptor.identifier.clone(), Arc::new(descriptor))
    }

    pub fn with(mut self, descriptor: TemplateDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn get(&self, identifier: &str) -> Option<&Arc<TemplateDescriptor>> {
        self.descriptors.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.descriptors.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All identifiers, sorted for stable output.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Descriptors flagged `Concrete`, sorted by identifier.
    pub fn concrete(&self) -> Vec<Arc<TemplateDescriptor>> {
        let mut out: Vec<_> = self
            .descriptors
            .values()
            .filter(|d| d.concrete)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TemplateDescriptor>> {
        self.descriptors.values()
    }
}

impl FromIterator<TemplateDescriptor> for DescriptorRegistry {
    fn from_iter<I: IntoIterator<Item = TemplateDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.insert(descriptor);
        }
        registry
    }
}

impl DescriptorLookup for DescriptorRegistry {
    fn descriptor(&self, identifier: &str) -> Option<Arc<TemplateDescriptor>> {
        self.descriptors.get(identifier).cloned()
    }
}
