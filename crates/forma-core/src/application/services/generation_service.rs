//! Generation Service - turns a resolved template into a generation plan.
//!
//! The plan is what a file writer needs: every node path, definition and
//! component name with placeholders substituted. Option units for the
//! selected values are merged in first, and option constraints are checked
//! up front. Nothing is written to disk here.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::{info, instrument, warn};

use crate::{
    application::ApplicationError,
    domain::{
        DefinitionValue, DomainError, ResolvedTemplate, SettingsMap, Substituted,
        SubstitutionContext, SubstitutionDiagnostic, SubstitutionEngine,
    },
    error::FormaResult,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedNode {
    /// Node as authored (also the definition key).
    pub source: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDefinition {
    pub source_key: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Template file to copy (file definitions only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beginning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedComponent {
    pub identifier: String,
    pub name: String,
    /// Option values forwarded to the component.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// Fully substituted view of one template for one run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPlan {
    pub template: String,
    pub nodes: Vec<PlannedNode>,
    pub definitions: Vec<PlannedDefinition>,
    pub components: Vec<PlannedComponent>,
    pub shared_settings: SettingsMap,
    pub configurations: BTreeMap<String, SettingsMap>,
    /// UUIDs generated during the run, by identifier.
    pub uuids: BTreeMap<String, String>,
    #[serde(serialize_with = "as_messages")]
    pub violations: Vec<DomainError>,
    pub diagnostics: Vec<SubstitutionDiagnostic>,
}

impl GenerationPlan {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.diagnostics.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.violations.len() + self.diagnostics.len()
    }

    /// The plan, or `GenerationIncomplete` when anything failed.
    pub fn into_result(self) -> FormaResult<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(ApplicationError::GenerationIncomplete {
                template: self.template.clone(),
                failures: self.failure_count(),
            }
            .into())
        }
    }
}

fn as_messages<S: Serializer>(errors: &[DomainError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// Service for building generation plans.
#[derive(Debug, Default)]
pub struct GenerationService;

impl GenerationService {
    pub fn new() -> Self {
        Self
    }

    /// Substitute every text field of `template` for this run.
    ///
    /// Failures are collected in the plan rather than returned, so one call
    /// reports every missing option across all fields.
    #[instrument(skip_all, fields(template = %template.identifier()))]
    pub fn plan(&self, template: &ResolvedTemplate, context: &SubstitutionContext) -> GenerationPlan {
        let violations = template.check_constraints(context.values());
        for violation in &violations {
            warn!(%violation, "option constraint violated");
        }

        let selected = template.apply_selections(context.values());
        let engine = SubstitutionEngine::new(&selected, context);
        let mut diagnostics = Vec::new();
        let mut run = |field: String, text: &str| -> String {
            let Substituted {
                text,
                diagnostics: found,
            } = engine.substitute(&field, text);
            diagnostics.extend(found);
            text
        };

        let nodes = selected
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, node)| PlannedNode {
                source: node.clone(),
                path: run(format!("Nodes[{i}]"), node),
            })
            .collect();

        let definitions = selected
            .definitions()
            .iter()
            .map(|(key, value)| {
                let planned_key = run(format!("Definitions[{key}]"), key);
                match value {
                    DefinitionValue::Text(text) => PlannedDefinition {
                        source_key: key.clone(),
                        key: planned_key,
                        text: Some(run(format!("Definitions[{key}].Text"), text)),
                        path: None,
                        group: Vec::new(),
                        beginning: None,
                        end: None,
                    },
                    DefinitionValue::File(file) => PlannedDefinition {
                        source_key: key.clone(),
                        key: planned_key,
                        text: None,
                        path: file
                            .path
                            .as_deref()
                            .map(|p| run(format!("Definitions[{key}].Path"), p)),
                        group: file
                            .group
                            .iter()
                            .enumerate()
                            .map(|(i, g)| run(format!("Definitions[{key}].Group[{i}]"), g))
                            .collect(),
                        beginning: file
                            .beginning
                            .as_deref()
                            .map(|b| run(format!("Definitions[{key}].Beginning"), b)),
                        end: file
                            .end
                            .as_deref()
                            .map(|e| run(format!("Definitions[{key}].End"), e)),
                    },
                }
            })
            .collect();

        let components = selected
            .components()
            .iter()
            .enumerate()
            .map(|(i, component)| PlannedComponent {
                identifier: component.identifier.clone(),
                name: run(
                    format!("Components[{i}].Name"),
                    component.name.as_deref().unwrap_or(&component.identifier),
                ),
                options: component
                    .options
                    .iter()
                    .map(|(k, v)| (k.clone(), run(format!("Components[{i}].Options[{k}]"), v)))
                    .collect(),
            })
            .collect();

        let shared_settings = selected
            .shared_settings()
            .iter()
            .map(|(k, v)| (k.clone(), run(format!("SharedSettings[{k}]"), v)))
            .collect();

        let configurations = selected
            .configurations()
            .iter()
            .map(|(config, settings)| {
                let settings = settings
                    .iter()
                    .map(|(k, v)| (k.clone(), run(format!("Configurations[{config}][{k}]"), v)))
                    .collect();
                (config.clone(), settings)
            })
            .collect();

        let plan = GenerationPlan {
            template: selected.identifier().to_string(),
            nodes,
            definitions,
            components,
            shared_settings,
            configurations,
            uuids: context.uuids().snapshot(),
            violations,
            diagnostics,
        };

        info!(
            nodes = plan.nodes.len(),
            definitions = plan.definitions.len(),
            failures = plan.failure_count(),
            "generation plan built"
        );
        plan
    }
}
