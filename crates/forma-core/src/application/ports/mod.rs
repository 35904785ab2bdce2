//! Application ports (traits) for external dependencies.
//!
//! - **Driven (Output) Ports**: called by the application, implemented by
//!   infrastructure in `forma-adapters`
//!   - `DescriptorStore`: descriptor storage and listing

pub mod output;

pub use output::DescriptorStore;
