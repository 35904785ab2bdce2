//! As-authored template descriptors.
//!
//! A [`TemplateDescriptor`] is the per-template field set *before*
//! inheritance is applied. Descriptors are decoded by an outer layer (the
//! property-list codec, or the TOML/JSON loader in `forma-adapters`) and are
//! read-only inputs to the core.
//!
//! ## Shape
//!
//! ```text
//! TemplateDescriptor
//! ├── Identifier / Kind / Ancestors
//! ├── Options           Vec<OptionDescriptor>   (ordered, keyed by identifier)
//! │    └── Units        value -> UnitFragment   (applied when selected)
//! ├── Nodes             Vec<String>             (ordered file/section paths)
//! ├── Definitions       path -> DefinitionValue (Text | File)
//! ├── RequiredOptions   option -> value
//! ├── Components        Vec<ComponentDescriptor> (keyed by identifier)
//! ├── SharedSettings    key -> value
//! └── Configurations    config -> key -> value
//! ```
//!
//! Field names serialize in PascalCase so that decoded property lists map
//! onto these types without renaming.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Flat build-setting dictionary (`KEY = value`).
pub type SettingsMap = BTreeMap<String, String>;

/// Per-configuration build settings (`Debug -> { KEY = value }`).
pub type ConfigurationSettings = BTreeMap<String, SettingsMap>;

// ============================================================================
// Template Kind
// ============================================================================

/// What a template produces.
///
/// Unknown kind strings are preserved verbatim in [`TemplateKind::Other`] so
/// that round-tripping a descriptor never loses information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TemplateKind {
    /// Whole project (one or more targets).
    Project,
    /// Single file (or file group) added to an existing project.
    File,
    Other(String),
}

impl From<String> for TemplateKind {
    fn from(raw: String) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower == "project" || raw.ends_with("ProjectTemplateUnitKind") {
            Self::Project
        } else if lower == "file" || raw.ends_with("FileTemplateKind") {
            Self::File
        } else {
            Self::Other(raw)
        }
    }
}

impl From<TemplateKind> for String {
    fn from(kind: TemplateKind) -> Self {
        match kind {
            TemplateKind::Project => "project".into(),
            TemplateKind::File => "file".into(),
            TemplateKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => f.write_str("project"),
            Self::File => f.write_str("file"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Declared type of a user-facing option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OptionType {
    /// Free-form text field.
    #[default]
    Text,
    /// One of an enumerated list of values.
    Popup,
    /// Boolean; values are `"true"` / `"false"`.
    Checkbox,
    /// Read-only value shown for information.
    Static,
    /// Text field with suggested values.
    Combo,
    Other(String),
}

impl From<String> for OptionType {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "popup" => Self::Popup,
            "checkbox" => Self::Checkbox,
            "static" => Self::Static,
            "combo" | "combobox" => Self::Combo,
            _ => Self::Other(raw),
        }
    }
}

impl From<OptionType> for String {
    fn from(ty: OptionType) -> Self {
        match ty {
            OptionType::Text => "text".into(),
            OptionType::Popup => "popup".into(),
            OptionType::Checkbox => "checkbox".into(),
            OptionType::Static => "static".into(),
            OptionType::Combo => "combo".into(),
            OptionType::Other(raw) => raw,
        }
    }
}

/// A user-configurable choice exposed by a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OptionDescriptor {
    pub identifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Type", default)]
    pub option_type: OptionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Enumerated values (popup / combo / checkbox).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Display titles, index-aligned with `values`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_titles: Vec<String>,

    /// Selected value -> other options that must hold specific values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_options: BTreeMap<String, BTreeMap<String, String>>,

    /// Selected value -> fragment merged into the template when chosen.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub units: BTreeMap<String, UnitFragment>,
}

impl OptionDescriptor {
    pub fn new(identifier: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
            description: None,
            option_type,
            default: None,
            required: false,
            values: Vec::new(),
            value_titles: Vec::new(),
            required_options: BTreeMap::new(),
            units: BTreeMap::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// When this option is `value`, option `other` must equal `other_value`.
    pub fn requires(
        mut self,
        value: impl Into<String>,
        other: impl Into<String>,
        other_value: impl Into<String>,
    ) -> Self {
        self.required_options
            .entry(value.into())
            .or_default()
            .insert(other.into(), other_value.into());
        self
    }

    pub fn unit(mut self, value: impl Into<String>, fragment: UnitFragment) -> Self {
        self.units.insert(value.into(), fragment);
        self
    }

    /// Title shown for `value`, falling back to the value itself.
    pub fn title_for<'a>(&'a self, value: &'a str) -> &'a str {
        self.values
            .iter()
            .position(|v| v == value)
            .and_then(|i| self.value_titles.get(i))
            .map_or(value, String::as_str)
    }

    /// Whether `value` is acceptable for this option.
    ///
    /// Popups are closed over `values`; checkboxes accept `true`/`false`;
    /// every other type accepts anything.
    pub fn accepts(&self, value: &str) -> bool {
        match self.option_type {
            OptionType::Popup if !self.values.is_empty() => self.values.iter().any(|v| v == value),
            OptionType::Checkbox => matches!(value, "true" | "false"),
            _ => true,
        }
    }

    /// [`accepts`](Self::accepts) as a `Result`.
    pub fn validate_value(&self, value: &str) -> Result<(), DomainError> {
        if self.accepts(value) {
            Ok(())
        } else {
            Err(DomainError::InvalidOptionValue {
                option: self.identifier.clone(),
                value: value.to_string(),
                allowed: self.values.clone(),
            })
        }
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// Value bound to a definition key: either literal text or a file spec.
///
/// Decoded untagged: a plain string becomes [`DefinitionValue::Text`], a
/// dictionary becomes [`DefinitionValue::File`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefinitionValue {
    Text(String),
    File(FileDefinition),
}

impl From<&str> for DefinitionValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<FileDefinition> for DefinitionValue {
    fn from(spec: FileDefinition) -> Self {
        Self::File(spec)
    }
}

/// File-backed definition: where the content comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileDefinition {
    /// Source path inside the template bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Group (folder) components in the generated project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<String>,

    /// Text emitted before the section body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beginning: Option<String>,

    /// Text emitted after the section body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<u32>,

    /// Indices of the targets that receive this file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_indices: Vec<u32>,
}

impl FileDefinition {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn group<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group = group.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// Components
// ============================================================================

/// A sub-template instantiated alongside the main one (e.g. a test bundle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComponentDescriptor {
    pub identifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Option values forwarded to the component template.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl ComponentDescriptor {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
            options: BTreeMap::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ============================================================================
// Unit Fragment
// ============================================================================

/// Partial field set attached to one value of an option.
///
/// When the value is selected the fragment is merged on top of the resolved
/// template with the same policy as an extra, most-derived descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnitFragment {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, DefinitionValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentDescriptor>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub shared_settings: SettingsMap,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configurations: ConfigurationSettings,
}

impl UnitFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn with_definition(mut self, key: impl Into<String>, value: impl Into<DefinitionValue>) -> Self {
        self.definitions.insert(key.into(), value.into());
        self
    }

    pub fn with_setting(
        mut self,
        configuration: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.configurations
            .entry(configuration.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Template Descriptor
// ============================================================================

/// The as-authored descriptor of one template.
///
/// Immutable once loaded: the registry hands out `Arc<TemplateDescriptor>`
/// and nothing in the core takes `&mut`. The `with_*` methods exist for
/// construction only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateDescriptor {
    pub identifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TemplateKind>,

    /// Ancestor identifiers, in inheritance order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Concrete templates are offered to users; abstract ones only exist
    /// to be inherited from.
    #[serde(default)]
    pub concrete: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, DefinitionValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_options: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentDescriptor>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub shared_settings: SettingsMap,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configurations: ConfigurationSettings,
}

impl TemplateDescriptor {
    /// Create an empty, abstract descriptor.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: None,
            ancestors: Vec::new(),
            name: None,
            description: None,
            concrete: false,
            platforms: Vec::new(),
            sort_order: None,
            options: Vec::new(),
            nodes: Vec::new(),
            definitions: BTreeMap::new(),
            required_options: BTreeMap::new(),
            components: Vec::new(),
            shared_settings: SettingsMap::new(),
            configurations: ConfigurationSettings::new(),
        }
    }

    pub fn kind(mut self, kind: TemplateKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn concrete(mut self) -> Self {
        self.concrete = true;
        self
    }

    pub fn with_ancestor(mut self, ancestor: impl Into<String>) -> Self {
        self.ancestors.push(ancestor.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platforms.push(platform.into());
        self
    }

    pub fn with_option(mut self, option: OptionDescriptor) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn with_definition(mut self, key: impl Into<String>, value: impl Into<DefinitionValue>) -> Self {
        self.definitions.insert(key.into(), value.into());
        self
    }

    pub fn with_required_option(mut self, option: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_options.insert(option.into(), value.into());
        self
    }

    pub fn with_component(mut self, component: ComponentDescriptor) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_shared_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.shared_settings.insert(key.into(), value.into());
        self
    }

    pub fn with_setting(
        mut self,
        configuration: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.configurations
            .entry(configuration.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_recognizes_unit_kind_suffixes() {
        assert_eq!(
            TemplateKind::from("Xcode.Xcode3.ProjectTemplateUnitKind".to_string()),
            TemplateKind::Project
        );
        assert_eq!(
            TemplateKind::from("Xcode.IDEFoundation.TextSubstitutionFileTemplateKind".to_string()),
            TemplateKind::File
        );
        assert_eq!(
            TemplateKind::from("Custom".to_string()),
            TemplateKind::Other("Custom".into())
        );
    }

    #[test]
    fn option_type_is_case_insensitive() {
        assert_eq!(OptionType::from("Popup".to_string()), OptionType::Popup);
        assert_eq!(OptionType::from("checkbox".to_string()), OptionType::Checkbox);
    }

    #[test]
    fn popup_accepts_only_declared_values() {
        let opt = OptionDescriptor::new("language", OptionType::Popup).values(["Swift", "ObjC"]);
        assert!(opt.accepts("Swift"));
        assert!(!opt.accepts("Rust"));
    }

    #[test]
    fn checkbox_accepts_booleans() {
        let opt = OptionDescriptor::new("tests", OptionType::Checkbox);
        assert!(opt.accepts("true"));
        assert!(!opt.accepts("yes"));
    }

    #[test]
    fn title_falls_back_to_value() {
        let mut opt = OptionDescriptor::new("language", OptionType::Popup).values(["Swift", "ObjC"]);
        opt.value_titles = vec!["Swift".into(), "Objective-C".into()];
        assert_eq!(opt.title_for("ObjC"), "Objective-C");
        assert_eq!(opt.title_for("Other"), "Other");
    }

    #[test]
    fn descriptor_decodes_pascal_case_keys() {
        let json = r#"{
            "Identifier": "app",
            "Kind": "Xcode.Xcode3.ProjectTemplateUnitKind",
            "Ancestors": ["base"],
            "Concrete": true,
            "Options": [{"Identifier": "productName", "Type": "text", "Required": true}],
            "Nodes": ["main.swift"],
            "Definitions": {
                "main.swift": {"Path": "main.swift", "Group": ["Sources"]},
                "*:imports": "import Foundation"
            }
        }"#;
        let descriptor: TemplateDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(descriptor.kind, Some(TemplateKind::Project));
        assert_eq!(descriptor.ancestors, vec!["base"]);
        assert!(descriptor.options[0].required);
        assert!(matches!(
            descriptor.definitions.get("*:imports"),
            Some(DefinitionValue::Text(t)) if t == "import Foundation"
        ));
        assert!(matches!(
            descriptor.definitions.get("main.swift"),
            Some(DefinitionValue::File(f)) if f.group == vec!["Sources"]
        ));
    }
}
