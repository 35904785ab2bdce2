//! Forma Core - template inheritance and placeholder substitution.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            forma-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (TemplateService, GenerationService)   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │           (DescriptorStore)             │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     forma-adapters (Infrastructure)     │
//! │ (InMemoryDescriptorStore, file loader)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (AncestorResolver, Merger, Tokenizer,   │
//! │  TransformRegistry, SubstitutionEngine) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use forma_core::prelude::*;
//!
//! let registry = DescriptorRegistry::new()
//!     .with(TemplateDescriptor::new("base").with_node("README.md"))
//!     .with(
//!         TemplateDescriptor::new("app")
//!             .with_ancestor("base")
//!             .with_node("___VARIABLE_name:upper___.txt"),
//!     );
//!
//! let chain = AncestorResolver::new(&registry).resolve("app").unwrap();
//! let resolved = Merger::merge(&chain).resolved;
//!
//! let ctx = SubstitutionContext::new(NamingFacts::new()).with_value("name", "widget");
//! let out = SubstitutionEngine::new(&resolved, &ctx).substitute("Nodes[1]", &resolved.nodes()[1]);
//! assert_eq!(out.text, "WIDGET.txt");
//! ```

pub mod domain;

pub mod application;

pub mod error;

/// Everything a typical caller needs.
pub mod prelude {
    pub use crate::application::{
        DescriptorStore, GenerationPlan, GenerationService, TemplateService, TemplateSummary,
    };
    pub use crate::domain::{
        AncestorResolver, DescriptorLookup, DescriptorRegistry, DomainError, Merger, NamingFacts,
        OptionDescriptor, OptionType, OptionValues, ResolvedTemplate, SubstitutionContext,
        SubstitutionEngine, TemplateDescriptor, TemplateKind, Transform, tokenize,
    };
    pub use crate::error::{FormaError, FormaResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
