//! Command handlers, one module per subcommand.

pub mod check;
pub mod config;
pub mod list;
pub mod render;
pub mod resolve;
pub mod tokens;

use forma_adapters::{FilesystemDescriptorLoader, InMemoryDescriptorStore};
use forma_core::application::TemplateService;
use tracing::debug;

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

/// Load the descriptor directory into a [`TemplateService`].
///
/// `--templates` wins over `templates.dir`; `--strict` or `templates.strict`
/// turns skipped files into errors.
pub(crate) fn load_service(global: &GlobalArgs, config: &AppConfig) -> CliResult<TemplateService> {
    let dir = global
        .templates
        .clone()
        .or_else(|| config.templates.dir.clone())
        .ok_or(CliError::NoTemplatesDir)?;

    let loader =
        FilesystemDescriptorLoader::new(dir).strict(global.strict || config.templates.strict);
    let store = InMemoryDescriptorStore::new();
    let count = loader.load_into(&store)?;
    debug!(count, root = %loader.root().display(), "descriptors loaded");

    Ok(TemplateService::new(Box::new(store)))
}
