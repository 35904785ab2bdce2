//! Implementation of the `forma resolve` command.

use crate::{
    cli::{GlobalArgs, ResolveArgs},
    commands::load_service,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Print the resolved template as JSON, or its chain with `--chain`.
///
/// Merge diagnostics are logged as warnings by the merger itself.
pub fn execute(
    args: ResolveArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let service = load_service(global, config)?;
    let outcome = service.resolve_with_diagnostics(&args.identifier)?;

    if args.chain {
        for identifier in outcome.resolved.chain() {
            output.data(identifier)?;
        }
    } else {
        output.json(&outcome.resolved)?;
    }
    Ok(())
}
