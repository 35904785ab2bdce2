//! Application layer for Forma.
//!
//! - **Services**: use-case orchestration (`TemplateService`, `GenerationService`)
//! - **Ports**: traits the infrastructure implements (`DescriptorStore`)
//! - **Errors**: orchestration failures
//!
//! Resolution, merge and substitution rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    CatalogEntry, GenerationPlan, GenerationService, PlannedComponent, PlannedDefinition,
    PlannedNode, TemplateService, TemplateSummary,
};

pub use ports::DescriptorStore;

pub use error::ApplicationError;
