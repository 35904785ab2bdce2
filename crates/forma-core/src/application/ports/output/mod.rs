//! Driven (output) ports - implemented by infrastructure.

use std::sync::Arc;

use crate::domain::{DescriptorLookup, TemplateDescriptor};
use crate::error::FormaResult;

/// Port for descriptor storage.
///
/// Extends the resolver's [`DescriptorLookup`] with listing and mutation.
///
/// Implemented by:
/// - `forma_adapters::InMemoryDescriptorStore`
pub trait DescriptorStore: DescriptorLookup {
    /// Every stored descriptor, sorted by identifier.
    fn list(&self) -> FormaResult<Vec<Arc<TemplateDescriptor>>>;

    /// Insert or replace; returns the displaced descriptor.
    fn insert(&self, descriptor: TemplateDescriptor) -> FormaResult<Option<Arc<TemplateDescriptor>>>;

    /// Remove by identifier; returns the removed descriptor.
    fn remove(&self, identifier: &str) -> FormaResult<Option<Arc<TemplateDescriptor>>>;
}
