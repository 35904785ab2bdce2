//! Template inheritance: ancestor-chain resolution and field merging.

pub mod merger;
pub mod resolver;

pub use merger::{MergeDiagnostic, MergeOutcome, Merger};
pub use resolver::{AncestorChain, AncestorResolver};
