//! Application services - orchestrate use cases.

pub mod generation_service;
pub mod template_service;

pub use generation_service::{
    GenerationPlan, GenerationService, PlannedComponent, PlannedDefinition, PlannedNode,
};
pub use template_service::{CatalogEntry, TemplateService, TemplateSummary};
