// ============================================================================
// domain/error.rs - TEMPLATE ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (collected per occurrence, re-reported by callers)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ========================================================================
    // Resolution Errors (fatal to one target)
    // ========================================================================
    #[error("cyclic inheritance: {}", chain.join(" -> "))]
    CyclicInheritance {
        /// Identifier that reappeared on the active path.
        identifier: String,
        /// Active path at the moment the cycle was detected, ending with `identifier`.
        chain: Vec<String>,
    },

    #[error("ancestor '{missing}' referenced by '{referenced_by}' is not in the registry")]
    UnresolvedAncestor {
        missing: String,
        referenced_by: String,
    },

    #[error("template '{identifier}' is not in the registry")]
    TemplateNotFound { identifier: String },

    // ========================================================================
    // Parse Errors (fatal to one field)
    // ========================================================================
    #[error("unknown transform '{transform}' in token '{token}' at offset {offset}")]
    UnknownTransform {
        transform: String,
        token: String,
        offset: usize,
    },

    // ========================================================================
    // Substitution Errors (reported per occurrence)
    // ========================================================================
    #[error("unknown variable '{token}' at offset {offset}")]
    UnknownVariable { token: String, offset: usize },

    #[error("required option '{option}' has no value and no default (offset {offset})")]
    MissingRequiredOption { option: String, offset: usize },

    // ========================================================================
    // Option Constraint Violations
    // ========================================================================
    #[error("value '{value}' is not allowed for option '{option}'; expected one of: {}", allowed.join(", "))]
    InvalidOptionValue {
        option: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error(
        "option '{option}' = '{value}' requires '{required_option}' = '{required_value}', got {}",
        actual.as_deref().unwrap_or("nothing")
    )]
    OptionConstraintViolated {
        option: String,
        value: String,
        required_option: String,
        required_value: String,
        actual: Option<String>,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CyclicInheritance { chain, .. } => vec![
                format!("Inheritance loop: {}", chain.join(" -> ")),
                "Remove one of the Ancestors entries that closes the loop".into(),
            ],
            Self::UnresolvedAncestor {
                missing,
                referenced_by,
            } => vec![
                format!("'{}' lists '{}' as an ancestor", referenced_by, missing),
                "Check the spelling of the ancestor identifier".into(),
                "Make sure the ancestor's descriptor is part of the catalog".into(),
            ],
            Self::TemplateNotFound { .. } => vec![
                "No descriptor with that identifier was loaded".into(),
                "Try: forma list".into(),
            ],
            Self::UnknownTransform { transform, .. } => vec![
                format!("'{}' is not a transform", transform),
                "Known transforms: identifier, rfc1034Identifier, bundleIdentifier, lower, upper, xml"
                    .into(),
                "Transform names are case-sensitive".into(),
            ],
            Self::MissingRequiredOption { option, .. } => vec![
                format!("Supply a value for '{}'", option),
                format!("Example: forma render <ID> --set {}=value", option),
            ],
            Self::InvalidOptionValue { allowed, .. } => {
                vec![format!("Choose one of: {}", allowed.join(", "))]
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CyclicInheritance { .. } => ErrorCategory::Validation,
            Self::UnknownTransform { .. } => ErrorCategory::Validation,
            Self::UnresolvedAncestor { .. } | Self::TemplateNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::UnknownVariable { .. }
            | Self::MissingRequiredOption { .. }
            | Self::InvalidOptionValue { .. }
            | Self::OptionConstraintViolated { .. } => ErrorCategory::Substitution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Substitution,
    NotFound,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_shows_full_chain() {
        let err = DomainError::CyclicInheritance {
            identifier: "a".into(),
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic inheritance: a -> b -> a");
    }

    #[test]
    fn unresolved_ancestor_names_both_sides() {
        let err = DomainError::UnresolvedAncestor {
            missing: "base".into(),
            referenced_by: "app".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'base'"));
        assert!(msg.contains("'app'"));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn constraint_violation_without_value_says_nothing() {
        let err = DomainError::OptionConstraintViolated {
            option: "ui".into(),
            value: "SwiftUI".into(),
            required_option: "language".into(),
            required_value: "Swift".into(),
            actual: None,
        };
        assert!(err.to_string().ends_with("got nothing"));
    }

    #[test]
    fn missing_option_suggests_set_flag() {
        let err = DomainError::MissingRequiredOption {
            option: "productName".into(),
            offset: 0,
        };
        assert!(err.suggestions().iter().any(|s| s.contains("--set productName")));
    }
}
