pub mod descriptor;
pub mod registry;
pub mod resolved;

pub use descriptor::{
    ComponentDescriptor, ConfigurationSettings, DefinitionValue, FileDefinition,
    OptionDescriptor, OptionType, SettingsMap, TemplateDescriptor, TemplateKind, UnitFragment,
};
pub use registry::{DescriptorLookup, DescriptorRegistry};
pub use resolved::ResolvedTemplate;
