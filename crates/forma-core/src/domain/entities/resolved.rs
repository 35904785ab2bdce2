//! Flattened templates.
//!
//! A [`ResolvedTemplate`] has the same shape as a descriptor but carries no
//! ancestor references: every collision along the chain has already been
//! settled by the merger. It is produced once per resolution and never
//! mutated; composing it further ([`ResolvedTemplate::apply_selections`])
//! returns a new value.

use std::collections::BTreeMap;

use serde::Serialize;

use super::descriptor::{
    ComponentDescriptor, ConfigurationSettings, DefinitionValue, OptionDescriptor, SettingsMap,
    TemplateKind,
};
use crate::domain::error::DomainError;
use crate::domain::inheritance::merger::FieldAccumulator;
use crate::domain::variables::OptionValues;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResolvedTemplate {
    pub(crate) identifier: String,
    /// Identifiers merged into this template, root-most first.
    pub(crate) chain: Vec<String>,
    pub(crate) kind: Option<TemplateKind>,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) concrete: bool,
    pub(crate) platforms: Vec<String>,
    pub(crate) sort_order: Option<i64>,
    pub(crate) options: Vec<OptionDescriptor>,
    pub(crate) nodes: Vec<String>,
    pub(crate) definitions: BTreeMap<String, DefinitionValue>,
    pub(crate) required_options: BTreeMap<String, String>,
    pub(crate) components: Vec<ComponentDescriptor>,
    pub(crate) shared_settings: SettingsMap,
    pub(crate) configurations: ConfigurationSettings,
}

impl ResolvedTemplate {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn kind(&self) -> Option<&TemplateKind> {
        self.kind.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_concrete(&self) -> bool {
        self.concrete
    }

    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    pub fn sort_order(&self) -> Option<i64> {
        self.sort_order
    }

    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    pub fn option(&self, identifier: &str) -> Option<&OptionDescriptor> {
        self.options.iter().find(|o| o.identifier == identifier)
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn definitions(&self) -> &BTreeMap<String, DefinitionValue> {
        &self.definitions
    }

    pub fn definition(&self, key: &str) -> Option<&DefinitionValue> {
        self.definitions.get(key)
    }

    pub fn required_options(&self) -> &BTreeMap<String, String> {
        &self.required_options
    }

    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    pub fn shared_settings(&self) -> &SettingsMap {
        &self.shared_settings
    }

    pub fn configurations(&self) -> &ConfigurationSettings {
        &self.configurations
    }

    /// Build settings for one configuration, layered over the shared ones.
    pub fn effective_settings(&self, configuration: &str) -> SettingsMap {
        let mut settings = self.shared_settings.clone();
        if let Some(specific) = self.configurations.get(configuration) {
            settings.extend(specific.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        settings
    }

    /// Value an option takes for this run: supplied, else declared default.
    pub fn selected_value<'a>(&'a self, identifier: &str, values: &'a OptionValues) -> Option<&'a str> {
        values
            .get(identifier)
            .map(String::as_str)
            .or_else(|| self.option(identifier).and_then(|o| o.default.as_deref()))
    }

    /// Return a new template with the unit fragment of every selected
    /// option value merged on top.
    ///
    /// Options are visited in declaration order, so a later option's unit
    /// wins a collision with an earlier one.
    pub fn apply_selections(&self, values: &OptionValues) -> ResolvedTemplate {
        let mut acc = FieldAccumulator::from_resolved(self);
        for option in &self.options {
            let Some(selected) = self.selected_value(&option.identifier, values) else {
                continue;
            };
            if let Some(fragment) = option.units.get(selected) {
                tracing::debug!(
                    option = %option.identifier,
                    value = %selected,
                    nodes = fragment.nodes.len(),
                    "applying option unit"
                );
                acc.apply_fragment(fragment);
            }
        }
        acc.finish_from(self)
    }

    /// Check supplied values against enumerations and per-value
    /// `RequiredOptions` constraints. Returns every violation found.
    pub fn check_constraints(&self, values: &OptionValues) -> Vec<DomainError> {
        let mut violations = Vec::new();

        for option in &self.options {
            let Some(selected) = self.selected_value(&option.identifier, values) else {
                continue;
            };

            if let Err(err) = option.validate_value(selected) {
                violations.push(err);
                continue;
            }

            let Some(constraints) = option.required_options.get(selected) else {
                continue;
            };
            for (other, required_value) in constraints {
                let actual = self.selected_value(other, values);
                if actual != Some(required_value.as_str()) {
                    violations.push(DomainError::OptionConstraintViolated {
                        option: option.identifier.clone(),
                        value: selected.to_string(),
                        required_option: other.clone(),
                        required_value: required_value.clone(),
                        actual: actual.map(str::to_string),
                    });
                }
            }
        }

        violations
    }
}
