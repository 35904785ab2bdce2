//! Application layer errors.
//!
//! Orchestration failures only. Template problems are `DomainError`s from
//! `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A descriptor source could not be read or decoded.
    #[error("Failed to load descriptor from {path}: {reason}")]
    DescriptorLoad { path: PathBuf, reason: String },

    /// Two descriptor sources declare the same identifier.
    #[error("Duplicate template identifier '{identifier}' in {path}")]
    DuplicateIdentifier { identifier: String, path: PathBuf },

    /// Store access failed (lock poisoned, etc.).
    #[error("Descriptor store error")]
    StoreLockError,

    /// Generation finished with unresolved placeholders or option violations.
    #[error("Generation of '{template}' reported {failures} problem(s)")]
    GenerationIncomplete { template: String, failures: usize },
}

impl ApplicationError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DescriptorLoad { path, .. } => vec![
                format!("Check the syntax of {}", path.display()),
                "Descriptors must be TOML or JSON with PascalCase keys".into(),
            ],
            Self::DuplicateIdentifier { identifier, .. } => vec![format!(
                "Rename one of the descriptors declaring '{identifier}'"
            )],
            Self::StoreLockError => vec![
                "The descriptor store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::GenerationIncomplete { .. } => vec![
                "Supply the missing option values with --set key=value".into(),
                "Or pass --allow-errors to keep the raw placeholders".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DescriptorLoad { .. } | Self::DuplicateIdentifier { .. } => {
                ErrorCategory::Validation
            }
            Self::StoreLockError => ErrorCategory::Internal,
            Self::GenerationIncomplete { .. } => ErrorCategory::Substitution,
        }
    }
}
