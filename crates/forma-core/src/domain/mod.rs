// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Forma.
//!
//! Pure, synchronous logic over in-memory values:
//!
//! - **entities**: descriptors as authored, the registry arena, resolved templates
//! - **inheritance**: ancestor-chain resolution and the field merger
//! - **variables**: placeholder tokenizer, transforms, substitution
//!
//! No file system or network access happens here; descriptors come in
//! already decoded and substituted strings go out.

pub mod entities;
pub mod error;
pub mod inheritance;
pub mod variables;

pub use entities::{
    ComponentDescriptor, ConfigurationSettings, DefinitionValue, DescriptorLookup,
    DescriptorRegistry, FileDefinition, OptionDescriptor, OptionType, ResolvedTemplate,
    SettingsMap, TemplateDescriptor, TemplateKind, UnitFragment,
};

pub use error::{DomainError, ErrorCategory};

pub use inheritance::{AncestorChain, AncestorResolver, MergeDiagnostic, MergeOutcome, Merger};

pub use variables::{
    NamingFacts, OptionValues, Substituted, SubstitutionContext, SubstitutionDiagnostic,
    SubstitutionEngine, Token, TokenStream, Transform, TransformRegistry, UuidCache,
    VariableToken, VariableTokenizer, tokenize,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(registry: &DescriptorRegistry, id: &str) -> ResolvedTemplate {
        let chain = AncestorResolver::new(registry).resolve(id).unwrap();
        Merger::merge(&chain).resolved
    }

    // ========================================================================
    // Resolution + Merge
    // ========================================================================

    #[test]
    fn base_mid_derived_scenario() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("Base")
                    .with_option(OptionDescriptor::new("lang", OptionType::Popup)),
            )
            .with(
                TemplateDescriptor::new("Mid")
                    .with_ancestor("Base")
                    .with_option(
                        OptionDescriptor::new("lang", OptionType::Popup).default_value("Swift"),
                    )
                    .with_node("a.txt"),
            )
            .with(
                TemplateDescriptor::new("Derived")
                    .with_ancestor("Mid")
                    .with_node("b.txt"),
            );

        let resolved = resolve(&registry, "Derived");
        assert_eq!(resolved.options().len(), 1);
        assert_eq!(resolved.options()[0].default.as_deref(), Some("Swift"));
        assert_eq!(resolved.nodes(), ["a.txt", "b.txt"]);
        assert_eq!(resolved.chain(), ["Base", "Mid", "Derived"]);
    }

    #[test]
    fn cycle_produces_no_template() {
        let registry =
            DescriptorRegistry::new().with(TemplateDescriptor::new("self").with_ancestor("self"));
        let err = AncestorResolver::new(&registry).resolve("self").unwrap_err();
        assert!(matches!(err, DomainError::CyclicInheritance { .. }));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    // ========================================================================
    // Resolution + Substitution
    // ========================================================================

    #[test]
    fn resolved_options_drive_substitution() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("base").with_option(
                    OptionDescriptor::new("productName", OptionType::Text).required(),
                ),
            )
            .with(
                TemplateDescriptor::new("app")
                    .with_ancestor("base")
                    .with_node("___VARIABLE_productName:identifier___/App.swift"),
            );
        let resolved = resolve(&registry, "app");

        let ctx = SubstitutionContext::new(NamingFacts::new()).with_value("productName", "My App");
        let engine = SubstitutionEngine::new(&resolved, &ctx);
        let out = engine.substitute("Nodes[0]", &resolved.nodes()[0]);
        assert_eq!(out.text, "My_App/App.swift");

        let empty = SubstitutionContext::default();
        let out = SubstitutionEngine::new(&resolved, &empty).substitute("Nodes[0]", &resolved.nodes()[0]);
        assert!(matches!(
            &out.diagnostics[0].error,
            DomainError::MissingRequiredOption { option, .. } if option == "productName"
        ));
    }
}
