//! Template Service - resolution and catalog operations.
//!
//! Resolves descriptors from a [`DescriptorStore`] into flattened
//! [`ResolvedTemplate`]s. Catalog builds resolve every concrete template in
//! parallel; each target gets its own `Result` so one broken chain never
//! hides the others.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::ports::DescriptorStore,
    domain::{
        AncestorResolver, DescriptorLookup, DomainError, MergeOutcome, Merger, ResolvedTemplate,
        TemplateDescriptor, TemplateKind,
    },
    error::FormaResult,
};

/// Descriptor metadata for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub identifier: String,
    pub name: String,
    pub kind: Option<TemplateKind>,
    pub concrete: bool,
    pub ancestors: Vec<String>,
    pub description: Option<String>,
    pub platforms: Vec<String>,
}

impl From<&TemplateDescriptor> for TemplateSummary {
    fn from(d: &TemplateDescriptor) -> Self {
        Self {
            identifier: d.identifier.clone(),
            name: d.display_name().to_string(),
            kind: d.kind.clone(),
            concrete: d.concrete,
            ancestors: d.ancestors.clone(),
            description: d.description.clone(),
            platforms: d.platforms.clone(),
        }
    }
}

/// One concrete template's resolution result.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub identifier: String,
    pub result: Result<ResolvedTemplate, DomainError>,
}

/// Service for template resolution.
pub struct TemplateService {
    store: Box<dyn DescriptorStore>,
}

impl TemplateService {
    pub fn new(store: Box<dyn DescriptorStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn DescriptorStore {
        self.store.as_ref()
    }

    /// Descriptor as authored.
    pub fn get(&self, identifier: &str) -> FormaResult<Arc<TemplateDescriptor>> {
        self.store.descriptor(identifier).ok_or_else(|| {
            DomainError::TemplateNotFound {
                identifier: identifier.to_string(),
            }
            .into()
        })
    }

    /// Add or replace a descriptor.
    pub fn save(&self, descriptor: TemplateDescriptor) -> FormaResult<()> {
        if let Some(previous) = self.store.insert(descriptor)? {
            debug!(identifier = %previous.identifier, "replaced descriptor");
        }
        Ok(())
    }

    /// Resolve and merge `identifier`, keeping merge diagnostics.
    #[instrument(skip(self))]
    pub fn resolve_with_diagnostics(&self, identifier: &str) -> FormaResult<MergeOutcome> {
        let chain = AncestorResolver::new(self.store.as_ref()).resolve(identifier)?;
        let outcome = Merger::merge(&chain);
        info!(
            depth = chain.len(),
            options = outcome.resolved.options().len(),
            nodes = outcome.resolved.nodes().len(),
            "template resolved"
        );
        Ok(outcome)
    }

    /// Resolve and merge `identifier`.
    pub fn resolve(&self, identifier: &str) -> FormaResult<ResolvedTemplate> {
        self.resolve_with_diagnostics(identifier)
            .map(|outcome| outcome.resolved)
    }

    /// Resolve every concrete template, in parallel.
    ///
    /// Entries are sorted by identifier. A failing chain is reported in its
    /// entry and does not abort the catalog.
    #[instrument(skip(self))]
    pub fn resolve_catalog(&self) -> FormaResult<Vec<CatalogEntry>> {
        let targets: Vec<String> = self
            .store
            .list()?
            .iter()
            .filter(|d| d.concrete)
            .map(|d| d.identifier.clone())
            .collect();

        let store = self.store.as_ref();
        let entries: Vec<CatalogEntry> = targets
            .into_par_iter()
            .map(|identifier| {
                let result = AncestorResolver::new(store)
                    .resolve(&identifier)
                    .map(|chain| Merger::merge(&chain).resolved);
                if let Err(err) = &result {
                    warn!(template = %identifier, error = %err, "template failed to resolve");
                }
                CatalogEntry { identifier, result }
            })
            .collect();

        let failed = entries.iter().filter(|e| e.result.is_err()).count();
        info!(templates = entries.len(), failed, "catalog resolved");
        Ok(entries)
    }

    /// All descriptors (abstract ones included), sorted by identifier.
    pub fn list(&self) -> FormaResult<Vec<TemplateSummary>> {
        Ok(self
            .store
            .list()?
            .iter()
            .map(|d| TemplateSummary::from(d.as_ref()))
            .collect())
    }
}
