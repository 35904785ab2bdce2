//! Deep merge of an ancestor chain into one [`ResolvedTemplate`].
//!
//! The merge is a left fold over the chain, root-most descriptor first, each
//! more-derived descriptor applied on top:
//!
//! | Field            | Policy                                                   |
//! |------------------|----------------------------------------------------------|
//! | Options          | keyed by identifier; derived replaces whole object in place, new ones appended |
//! | Nodes            | concatenated, first occurrence kept                      |
//! | Definitions      | keyed union, derived wins                                |
//! | RequiredOptions  | keyed union, derived wins                                |
//! | Components       | keyed by identifier; derived replaces in place, new ones appended |
//! | SharedSettings   | keyed union, derived wins                                |
//! | Configurations   | configurations unioned; keys unioned, derived wins       |
//! | Name/Description/SortOrder | derived wins when set                          |
//! | Platforms        | unioned, first occurrence kept                           |
//! | Kind/Concrete    | taken from the target only                               |
//!
//! The merge cannot fail. A descriptor declaring the same option identifier
//! twice produces a [`MergeDiagnostic`], not an error.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use tracing::{debug, instrument, warn};

use super::resolver::AncestorChain;
use crate::domain::entities::descriptor::{
    ComponentDescriptor, ConfigurationSettings, DefinitionValue, OptionDescriptor, SettingsMap,
    TemplateDescriptor, UnitFragment,
};
use crate::domain::entities::resolved::ResolvedTemplate;

/// Non-fatal finding produced while merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDiagnostic {
    /// One descriptor (not the chain) declares the same option twice.
    DuplicateOptionIdentifier { template: String, option: String },
}

impl fmt::Display for MergeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateOptionIdentifier { template, option } => write!(
                f,
                "template '{template}' declares option '{option}' more than once"
            ),
        }
    }
}

/// Result of a merge: the template plus warning-level diagnostics.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub resolved: ResolvedTemplate,
    pub diagnostics: Vec<MergeDiagnostic>,
}

/// Folds an [`AncestorChain`] into a [`ResolvedTemplate`].
pub struct Merger;

impl Merger {
    /// Merge `chain` (root-most first, target last).
    ///
    /// Deterministic: the same chain always yields an equal template.
    #[instrument(skip_all, fields(target = %chain.target().identifier, depth = chain.len()))]
    pub fn merge(chain: &AncestorChain) -> MergeOutcome {
        let mut acc = FieldAccumulator::default();
        let mut diagnostics = Vec::new();

        for descriptor in chain.descriptors() {
            acc.apply_descriptor(descriptor, &mut diagnostics);
        }

        for diagnostic in &diagnostics {
            warn!(%diagnostic, "authoring problem in template");
        }

        let target = chain.target();
        let resolved = acc.finish(
            target,
            chain.identifiers().into_iter().map(str::to_string).collect(),
        );
        debug!(
            options = resolved.options.len(),
            nodes = resolved.nodes.len(),
            definitions = resolved.definitions.len(),
            "chain merged"
        );

        MergeOutcome {
            resolved,
            diagnostics,
        }
    }
}

/// Mutable working state of a merge.
///
/// Shared by chain merging and by option-unit application so that both
/// follow exactly the same policy.
#[derive(Debug, Default)]
pub(crate) struct FieldAccumulator {
    name: Option<String>,
    description: Option<String>,
    sort_order: Option<i64>,
    platforms: Vec<String>,
    options: Vec<OptionDescriptor>,
    nodes: Vec<String>,
    seen_nodes: HashSet<String>,
    definitions: BTreeMap<String, DefinitionValue>,
    required_options: BTreeMap<String, String>,
    components: Vec<ComponentDescriptor>,
    shared_settings: SettingsMap,
    configurations: ConfigurationSettings,
}

impl FieldAccumulator {
    pub(crate) fn from_resolved(resolved: &ResolvedTemplate) -> Self {
        Self {
            name: resolved.name.clone(),
            description: resolved.description.clone(),
            sort_order: resolved.sort_order,
            platforms: resolved.platforms.clone(),
            options: resolved.options.clone(),
            nodes: resolved.nodes.clone(),
            seen_nodes: resolved.nodes.iter().cloned().collect(),
            definitions: resolved.definitions.clone(),
            required_options: resolved.required_options.clone(),
            components: resolved.components.clone(),
            shared_settings: resolved.shared_settings.clone(),
            configurations: resolved.configurations.clone(),
        }
    }

    pub(crate) fn apply_descriptor(
        &mut self,
        descriptor: &TemplateDescriptor,
        diagnostics: &mut Vec<MergeDiagnostic>,
    ) {
        if descriptor.name.is_some() {
            self.name.clone_from(&descriptor.name);
        }
        if descriptor.description.is_some() {
            self.description.clone_from(&descriptor.description);
        }
        if descriptor.sort_order.is_some() {
            self.sort_order = descriptor.sort_order;
        }
        for platform in &descriptor.platforms {
            if !self.platforms.contains(platform) {
                self.platforms.push(platform.clone());
            }
        }

        report_duplicate_options(descriptor, diagnostics);
        merge_keyed(&mut self.options, &descriptor.options, |o| &o.identifier);

        self.merge_nodes(&descriptor.nodes);
        extend_cloned(&mut self.definitions, &descriptor.definitions);
        extend_cloned(&mut self.required_options, &descriptor.required_options);
        merge_keyed(&mut self.components, &descriptor.components, |c| {
            &c.identifier
        });
        extend_cloned(&mut self.shared_settings, &descriptor.shared_settings);
        merge_configurations(&mut self.configurations, &descriptor.configurations);
    }

    pub(crate) fn apply_fragment(&mut self, fragment: &UnitFragment) {
        self.merge_nodes(&fragment.nodes);
        extend_cloned(&mut self.definitions, &fragment.definitions);
        merge_keyed(&mut self.components, &fragment.components, |c| {
            &c.identifier
        });
        extend_cloned(&mut self.shared_settings, &fragment.shared_settings);
        merge_configurations(&mut self.configurations, &fragment.configurations);
    }

    fn merge_nodes(&mut self, incoming: &[String]) {
        for node in incoming {
            if self.seen_nodes.insert(node.clone()) {
                self.nodes.push(node.clone());
            }
        }
    }

    pub(crate) fn finish(self, target: &TemplateDescriptor, chain: Vec<String>) -> ResolvedTemplate {
        ResolvedTemplate {
            identifier: target.identifier.clone(),
            chain,
            kind: target.kind.clone(),
            concrete: target.concrete,
            name: self.name,
            description: self.description,
            platforms: self.platforms,
            sort_order: self.sort_order,
            options: self.options,
            nodes: self.nodes,
            definitions: self.definitions,
            required_options: self.required_options,
            components: self.components,
            shared_settings: self.shared_settings,
            configurations: self.configurations,
        }
    }

    /// Finish a composition of an already-resolved template, keeping its identity.
    pub(crate) fn finish_from(self, base: &ResolvedTemplate) -> ResolvedTemplate {
        ResolvedTemplate {
            identifier: base.identifier.clone(),
            chain: base.chain.clone(),
            kind: base.kind.clone(),
            concrete: base.concrete,
            name: self.name,
            description: self.description,
            platforms: self.platforms,
            sort_order: self.sort_order,
            options: self.options,
            nodes: self.nodes,
            definitions: self.definitions,
            required_options: self.required_options,
            components: self.components,
            shared_settings: self.shared_settings,
            configurations: self.configurations,
        }
    }
}

fn report_duplicate_options(descriptor: &TemplateDescriptor, diagnostics: &mut Vec<MergeDiagnostic>) {
    let mut seen = HashSet::new();
    for option in &descriptor.options {
        if !seen.insert(option.identifier.as_str()) {
            diagnostics.push(MergeDiagnostic::DuplicateOptionIdentifier {
                template: descriptor.identifier.clone(),
                option: option.identifier.clone(),
            });
        }
    }
}

/// Replace-in-place or append, keyed by `key`.
fn merge_keyed<T, F>(acc: &mut Vec<T>, incoming: &[T], key: F)
where
    T: Clone,
    F: Fn(&T) -> &String,
{
    let mut index: HashMap<String, usize> = acc
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item).clone(), i))
        .collect();

    for item in incoming {
        match index.get(key(item)) {
            Some(&i) => acc[i] = item.clone(),
            None => {
                index.insert(key(item).clone(), acc.len());
                acc.push(item.clone());
            }
        }
    }
}

fn extend_cloned<V: Clone>(acc: &mut BTreeMap<String, V>, incoming: &BTreeMap<String, V>) {
    acc.extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
}

fn merge_configurations(acc: &mut ConfigurationSettings, incoming: &ConfigurationSettings) {
    for (configuration, settings) in incoming {
        extend_cloned(acc.entry(configuration.clone()).or_default(), settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::descriptor::{FileDefinition, OptionType};
    use crate::domain::entities::registry::DescriptorRegistry;
    use crate::domain::inheritance::resolver::AncestorResolver;
    use crate::domain::variables::OptionValues;

    fn resolve(registry: &DescriptorRegistry, target: &str) -> MergeOutcome {
        let chain = AncestorResolver::new(registry).resolve(target).unwrap();
        Merger::merge(&chain)
    }

    fn lang(default: Option<&str>) -> OptionDescriptor {
        let opt = OptionDescriptor::new("lang", OptionType::Popup).values(["Swift", "ObjC"]);
        match default {
            Some(d) => opt.default_value(d),
            None => opt,
        }
    }

    #[test]
    fn derived_option_replaces_and_nodes_append() {
        let registry = DescriptorRegistry::new()
            .with(TemplateDescriptor::new("Base").with_option(lang(None)))
            .with(
                TemplateDescriptor::new("Mid")
                    .with_ancestor("Base")
                    .with_option(lang(Some("Swift")))
                    .with_node("a.txt"),
            )
            .with(
                TemplateDescriptor::new("Derived")
                    .with_ancestor("Mid")
                    .with_node("b.txt"),
            );

        let outcome = resolve(&registry, "Derived");
        let resolved = outcome.resolved;

        assert_eq!(resolved.options().len(), 1);
        assert_eq!(resolved.options()[0].default.as_deref(), Some("Swift"));
        assert_eq!(resolved.nodes(), ["a.txt", "b.txt"]);
        assert_eq!(resolved.chain(), ["Base", "Mid", "Derived"]);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn option_replacement_is_whole_object_not_field_patch() {
        let base = OptionDescriptor::new("name", OptionType::Text)
            .description("from base")
            .required();
        let derived = OptionDescriptor::new("name", OptionType::Text).default_value("App");

        let registry = DescriptorRegistry::new()
            .with(TemplateDescriptor::new("Base").with_option(base))
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_option(derived),
            );

        let resolved = resolve(&registry, "App").resolved;
        let option = resolved.option("name").unwrap();
        assert_eq!(option.description, None);
        assert!(!option.required);
    }

    #[test]
    fn replaced_option_keeps_ancestor_position() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("Base")
                    .with_option(OptionDescriptor::new("a", OptionType::Text))
                    .with_option(OptionDescriptor::new("b", OptionType::Text)),
            )
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_option(OptionDescriptor::new("c", OptionType::Text))
                    .with_option(OptionDescriptor::new("a", OptionType::Checkbox)),
            );

        let resolved = resolve(&registry, "App").resolved;
        let ids: Vec<_> = resolved.options().iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(resolved.options()[0].option_type, OptionType::Checkbox);
    }

    #[test]
    fn derived_cannot_reorder_ancestor_nodes() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("Base")
                    .with_node("one")
                    .with_node("two"),
            )
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_node("two")
                    .with_node("three")
                    .with_node("one"),
            );

        let resolved = resolve(&registry, "App").resolved;
        assert_eq!(resolved.nodes(), ["one", "two", "three"]);
    }

    #[test]
    fn definitions_and_required_options_derived_wins() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("Base")
                    .with_definition("main.swift", FileDefinition::at("base/main.swift"))
                    .with_definition("*:imports", "import Foundation")
                    .with_required_option("platform", "macOS"),
            )
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_definition("main.swift", "print(\"hi\")")
                    .with_required_option("platform", "iOS")
                    .with_required_option("ui", "SwiftUI"),
            );

        let resolved = resolve(&registry, "App").resolved;
        assert_eq!(
            resolved.definition("main.swift"),
            Some(&DefinitionValue::Text("print(\"hi\")".into()))
        );
        assert!(resolved.definition("*:imports").is_some());
        assert_eq!(resolved.required_options().get("platform").unwrap(), "iOS");
        assert_eq!(resolved.required_options().len(), 2);
    }

    #[test]
    fn components_replace_in_place_or_append() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("Base")
                    .with_component(ComponentDescriptor::new("tests").name("Old"))
                    .with_component(ComponentDescriptor::new("docs")),
            )
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_component(ComponentDescriptor::new("uitests"))
                    .with_component(ComponentDescriptor::new("tests").name("New")),
            );

        let resolved = resolve(&registry, "App").resolved;
        let ids: Vec<_> = resolved
            .components()
            .iter()
            .map(|c| c.identifier.as_str())
            .collect();
        assert_eq!(ids, ["tests", "docs", "uitests"]);
        assert_eq!(resolved.components()[0].name.as_deref(), Some("New"));
    }

    #[test]
    fn build_settings_merge_two_levels() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("Base")
                    .with_setting("Debug", "OPT", "-Onone")
                    .with_setting("Debug", "DEBUG_INFO", "YES")
                    .with_setting("Release", "OPT", "-O")
                    .with_shared_setting("SDKROOT", "macosx"),
            )
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_setting("Debug", "OPT", "-Og")
                    .with_setting("Profile", "OPT", "-O")
                    .with_shared_setting("SDKROOT", "iphoneos"),
            );

        let resolved = resolve(&registry, "App").resolved;
        let debug = &resolved.configurations()["Debug"];
        assert_eq!(debug["OPT"], "-Og");
        assert_eq!(debug["DEBUG_INFO"], "YES");
        assert_eq!(resolved.configurations()["Release"]["OPT"], "-O");
        assert!(resolved.configurations().contains_key("Profile"));
        assert_eq!(resolved.shared_settings()["SDKROOT"], "iphoneos");

        let effective = resolved.effective_settings("Debug");
        assert_eq!(effective["SDKROOT"], "iphoneos");
        assert_eq!(effective["OPT"], "-Og");
    }

    #[test]
    fn kind_and_concrete_come_from_target_only() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("Base")
                    .concrete()
                    .name("Base Name")
                    .with_platform("macOS"),
            )
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_platform("iOS")
                    .with_platform("macOS"),
            );

        let resolved = resolve(&registry, "App").resolved;
        assert!(!resolved.is_concrete());
        assert_eq!(resolved.name(), Some("Base Name"));
        assert_eq!(resolved.platforms(), ["macOS", "iOS"]);
    }

    #[test]
    fn duplicate_option_within_one_descriptor_is_a_diagnostic() {
        let registry = DescriptorRegistry::new().with(
            TemplateDescriptor::new("App")
                .with_option(OptionDescriptor::new("x", OptionType::Text).default_value("1"))
                .with_option(OptionDescriptor::new("x", OptionType::Text).default_value("2")),
        );

        let outcome = resolve(&registry, "App");
        assert_eq!(
            outcome.diagnostics,
            vec![MergeDiagnostic::DuplicateOptionIdentifier {
                template: "App".into(),
                option: "x".into(),
            }]
        );
        assert_eq!(outcome.resolved.options().len(), 1);
        assert_eq!(outcome.resolved.options()[0].default.as_deref(), Some("2"));
    }

    #[test]
    fn same_option_across_ancestors_is_not_a_diagnostic() {
        let registry = DescriptorRegistry::new()
            .with(TemplateDescriptor::new("Base").with_option(lang(None)))
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_option(lang(Some("ObjC"))),
            );

        assert!(resolve(&registry, "App").diagnostics.is_empty());
    }

    #[test]
    fn merge_is_deterministic() {
        let registry = DescriptorRegistry::new()
            .with(
                TemplateDescriptor::new("Base")
                    .with_option(lang(None))
                    .with_setting("Debug", "A", "1")
                    .with_definition("k", "v"),
            )
            .with(
                TemplateDescriptor::new("App")
                    .with_ancestor("Base")
                    .with_node("n")
                    .with_setting("Debug", "B", "2"),
            );

        let chain = AncestorResolver::new(&registry).resolve("App").unwrap();
        let first = Merger::merge(&chain).resolved;
        let second = Merger::merge(&chain).resolved;
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    // ── option units ──────────────────────────────────────────────────────

    fn unit_registry() -> DescriptorRegistry {
        let language = lang(Some("Swift"))
            .unit(
                "Swift",
                UnitFragment::new()
                    .with_node("main.swift")
                    .with_definition("main.swift", FileDefinition::at("main.swift"))
                    .with_setting("Debug", "SWIFT_OPTIMIZATION_LEVEL", "-Onone"),
            )
            .unit("ObjC", UnitFragment::new().with_node("main.m"));
        let tests = OptionDescriptor::new("tests", OptionType::Checkbox)
            .default_value("false")
            .unit("true", UnitFragment::new().with_node("Tests.swift"))
            .requires("true", "lang", "Swift");

        DescriptorRegistry::new().with(
            TemplateDescriptor::new("App")
                .with_node("Info.plist")
                .with_option(language)
                .with_option(tests),
        )
    }

    #[test]
    fn selections_apply_default_units() {
        let resolved = resolve(&unit_registry(), "App").resolved;
        let applied = resolved.apply_selections(&OptionValues::new());

        assert_eq!(applied.nodes(), ["Info.plist", "main.swift"]);
        assert!(applied.definition("main.swift").is_some());
        assert_eq!(
            applied.configurations()["Debug"]["SWIFT_OPTIMIZATION_LEVEL"],
            "-Onone"
        );
        // The source template is untouched.
        assert_eq!(resolved.nodes(), ["Info.plist"]);
    }

    #[test]
    fn selections_follow_supplied_values() {
        let resolved = resolve(&unit_registry(), "App").resolved;
        let values = OptionValues::from([
            ("lang".to_string(), "ObjC".to_string()),
            ("tests".to_string(), "true".to_string()),
        ]);
        let applied = resolved.apply_selections(&values);
        assert_eq!(applied.nodes(), ["Info.plist", "main.m", "Tests.swift"]);
    }

    #[test]
    fn constraints_report_violations() {
        let resolved = resolve(&unit_registry(), "App").resolved;

        let ok = OptionValues::from([("tests".to_string(), "true".to_string())]);
        assert!(resolved.check_constraints(&ok).is_empty());

        let bad = OptionValues::from([
            ("lang".to_string(), "ObjC".to_string()),
            ("tests".to_string(), "true".to_string()),
        ]);
        let violations = resolved.check_constraints(&bad);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0],
            crate::domain::DomainError::OptionConstraintViolated { required_option, actual, .. }
                if required_option == "lang" && actual.as_deref() == Some("ObjC")
        ));

        let invalid = OptionValues::from([("lang".to_string(), "Rust".to_string())]);
        assert!(matches!(
            resolved.check_constraints(&invalid).as_slice(),
            [crate::domain::DomainError::InvalidOptionValue { .. }]
        ));
    }
}
