//! Infrastructure adapters for Forma.
//!
//! This crate implements the ports defined in `forma-core::application::ports`.
//! It contains all file-system access and descriptor decoding.

pub mod descriptor_loader;
pub mod descriptor_store;

// Re-export commonly used adapters
pub use descriptor_loader::{DescriptorFormat, FilesystemDescriptorLoader, ParseError};
pub use descriptor_store::InMemoryDescriptorStore;
