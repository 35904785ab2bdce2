//! Implementation of the `forma list` command.

use forma_core::application::TemplateSummary;

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat},
    commands::load_service,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: ListArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let service = load_service(global, config)?;
    let templates: Vec<TemplateSummary> = service
        .list()?
        .into_iter()
        .filter(|t| args.all || t.concrete)
        .collect();

    match args.format {
        ListFormat::Table => {
            if templates.is_empty() {
                output.warning("No templates found")?;
                return Ok(());
            }
            output.header("Available Templates:")?;
            let width = templates
                .iter()
                .map(|t| t.identifier.len())
                .max()
                .unwrap_or(0);
            for template in &templates {
                output.data(&format!(
                    "  {:<width$}  {:<8}  {}{}",
                    template.identifier,
                    kind_label(template),
                    template.name,
                    if template.concrete { "" } else { " (abstract)" },
                ))?;
            }
        }

        // JSON bypasses the human formatting so it stays parseable in pipes.
        ListFormat::Json => output.json(&templates)?,

        ListFormat::List => {
            for t in &templates {
                output.data(&t.identifier)?;
            }
        }

        ListFormat::Csv => {
            output.data("identifier,name,kind,concrete,ancestors")?;
            for t in &templates {
                output.data(&format!(
                    "{},{},{},{},{}",
                    t.identifier,
                    t.name,
                    kind_label(t),
                    t.concrete,
                    t.ancestors.join(";")
                ))?;
            }
        }
    }

    Ok(())
}

fn kind_label(template: &TemplateSummary) -> String {
    template
        .kind
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string)
}
