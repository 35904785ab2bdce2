//! Descriptor storage adapters.

pub mod memory;

pub use memory::InMemoryDescriptorStore;
