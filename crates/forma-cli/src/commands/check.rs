//! Implementation of the `forma check` command.

use serde::Serialize;

use crate::{
    cli::{GlobalArgs, OutputFormat},
    commands::load_service,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct CheckRow<'a> {
    identifier: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Resolve every concrete template; fails if any chain is broken.
pub fn execute(global: &GlobalArgs, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let service = load_service(global, config)?;
    let catalog = service.resolve_catalog()?;
    let total = catalog.len();
    let failed = catalog.iter().filter(|e| e.result.is_err()).count();

    if output.format() == OutputFormat::Json {
        let rows: Vec<CheckRow<'_>> = catalog
            .iter()
            .map(|entry| CheckRow {
                identifier: &entry.identifier,
                ok: entry.result.is_ok(),
                error: entry.result.as_ref().err().map(ToString::to_string),
            })
            .collect();
        output.json(&rows)?;
    } else {
        for entry in &catalog {
            match &entry.result {
                Ok(resolved) => output.success(&format!(
                    "{} ({} ancestors, {} nodes)",
                    entry.identifier,
                    resolved.chain().len().saturating_sub(1),
                    resolved.nodes().len()
                ))?,
                Err(e) => output.error(&format!("{}: {e}", entry.identifier))?,
            }
        }
    }

    if failed > 0 {
        return Err(CliError::BrokenCatalog { failed, total });
    }
    output.info(&format!("{total} templates resolved"))?;
    Ok(())
}
