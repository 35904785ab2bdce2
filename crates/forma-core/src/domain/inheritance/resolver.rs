//! Ancestor-chain resolution.
//!
//! Flattens the "Ancestors" graph of one target into a root-to-self list.
//! The walk is depth-first over each descriptor's ancestors in listed order,
//! resolving an ancestor's own ancestors before the ancestor itself. A shared
//! base reachable through several paths is emitted once, at its first
//! position, so diamonds never duplicate fields.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::entities::descriptor::TemplateDescriptor;
use crate::domain::entities::registry::DescriptorLookup;
use crate::domain::error::DomainError;

/// Non-empty, root-most-first list of descriptors ending with the target.
#[derive(Debug, Clone)]
pub struct AncestorChain {
    descriptors: Vec<Arc<TemplateDescriptor>>,
}

impl AncestorChain {
    pub fn descriptors(&self) -> &[Arc<TemplateDescriptor>] {
        &self.descriptors
    }

    /// The descriptor the chain was resolved for (always last).
    pub fn target(&self) -> &TemplateDescriptor {
        // Non-empty by construction.
        &self.descriptors[self.descriptors.len() - 1]
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .map(|d| d.identifier.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Computes [`AncestorChain`]s against a lookup capability.
///
/// Stateless between calls; one resolver can serve many targets, from many
/// threads, as long as the lookup is shared read-only.
pub struct AncestorResolver<'a, L: DescriptorLookup + ?Sized> {
    lookup: &'a L,
}

/// Per-call DFS bookkeeping.
#[derive(Default)]
struct Walk {
    /// Identifiers on the active path, in visit order (for cycle reports).
    path: Vec<String>,
    in_progress: HashSet<String>,
    emitted: HashSet<String>,
    order: Vec<Arc<TemplateDescriptor>>,
}

impl<'a, L: DescriptorLookup + ?Sized> AncestorResolver<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Resolve `target` into its root-to-self chain.
    ///
    /// # Errors
    /// - `TemplateNotFound`: `target` itself is not registered
    /// - `UnresolvedAncestor`: an ancestor identifier is not registered
    /// - `CyclicInheritance`: an identifier reappears on the active path
    #[instrument(skip(self), fields(target = %target))]
    pub fn resolve(&self, target: &str) -> Result<AncestorChain, DomainError> {
        let descriptor =
            self.lookup
                .descriptor(target)
                .ok_or_else(|| DomainError::TemplateNotFound {
                    identifier: target.to_string(),
                })?;

        let mut walk = Walk::default();
        self.visit(descriptor, &mut walk)?;

        debug!(
            chain = ?walk.order.iter().map(|d| d.identifier.as_str()).collect::<Vec<_>>(),
            "ancestor chain resolved"
        );

        // `visit` always pushes the target last.
        Ok(AncestorChain {
            descriptors: walk.order,
        })
    }

    fn visit(&self, descriptor: Arc<TemplateDescriptor>, walk: &mut Walk) -> Result<(), DomainError> {
        let id = descriptor.identifier.clone();
        walk.path.push(id.clone());
        walk.in_progress.insert(id.clone());

        for ancestor in &descriptor.ancestors {
            if walk.in_progress.contains(ancestor) {
                let mut chain = walk.path.clone();
                chain.push(ancestor.clone());
                return Err(DomainError::CyclicInheritance {
                    identifier: ancestor.clone(),
                    chain,
                });
            }
            if walk.emitted.contains(ancestor) {
                trace!(ancestor = %ancestor, "shared ancestor already emitted");
                continue;
            }

            let resolved = self.lookup.descriptor(ancestor).ok_or_else(|| {
                DomainError::UnresolvedAncestor {
                    missing: ancestor.clone(),
                    referenced_by: id.clone(),
                }
            })?;
            self.visit(resolved, walk)?;
        }

        walk.path.pop();
        walk.in_progress.remove(&id);
        walk.emitted.insert(id);
        walk.order.push(descriptor);
        Ok(())
    }
}
