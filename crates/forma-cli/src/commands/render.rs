//! Implementation of the `forma render` command.

use chrono::{DateTime, Datelike, Local};
use forma_core::{
    application::GenerationService,
    domain::{NamingFacts, OptionValues, SubstitutionContext},
};
use tracing::info;

use crate::{
    cli::{GlobalArgs, RenderArgs},
    commands::load_service,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Print the generation plan as JSON.
///
/// The plan is printed even when substitution failed so every diagnostic is
/// visible; the exit status is then non-zero unless `--allow-errors` is set.
pub fn execute(
    args: RenderArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let service = load_service(global, config)?;
    let template = service.resolve(&args.identifier)?;

    let facts = naming_facts(&args, config, Local::now());
    let values: OptionValues = args.set.iter().cloned().collect();
    let context = SubstitutionContext::new(facts).with_values(values);

    let plan = GenerationService::new().plan(&template, &context);
    output.json(&plan)?;

    if !plan.is_clean() && args.allow_errors {
        info!(failures = plan.failure_count(), "ignoring substitution failures");
        return Ok(());
    }
    plan.into_result()?;
    Ok(())
}

/// Naming facts for one run: flags, then config defaults, then the clock.
/// `--fact` overrides are applied last.
fn naming_facts(args: &RenderArgs, config: &AppConfig, now: DateTime<Local>) -> NamingFacts {
    let mut builder = NamingFacts::builder()
        .date(now.format("%Y-%m-%d").to_string())
        .time(now.format("%H:%M").to_string())
        .year(now.year().to_string());

    let organization = args
        .organization
        .as_ref()
        .or(config.naming.organization_name.as_ref());

    if let Some(v) = &args.file_name {
        builder = builder.file_name(v);
    }
    if let Some(v) = &args.package_name {
        builder = builder.package_name(v);
    }
    if let Some(v) = &args.project_name {
        builder = builder.project_name(v);
    }
    if let Some(v) = &args.product_name {
        builder = builder.product_name(v);
    }
    if let Some(v) = &args.target_name {
        builder = builder.target_name(v);
    }
    if let Some(v) = organization {
        builder = builder.organization_name(v);
    }
    if let Some(v) = &config.naming.full_user_name {
        builder = builder.full_user_name(v);
    }
    if let Some(v) = config.user_name() {
        builder = builder.user_name(v);
    }
    for (name, value) in &args.fact {
        builder = builder.fact(name, value);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn args() -> RenderArgs {
        RenderArgs {
            identifier: "t".into(),
            set: Vec::new(),
            fact: Vec::new(),
            file_name: Some("ContentView.swift".into()),
            package_name: Some("Demo App".into()),
            project_name: None,
            product_name: None,
            target_name: None,
            organization: None,
            allow_errors: false,
        }
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 12, 5, 0).unwrap()
    }

    #[test]
    fn clock_and_flags_become_facts() {
        let facts = naming_facts(&args(), &AppConfig::default(), noon());
        assert_eq!(facts.get("DATE"), Some("2024-03-09"));
        assert_eq!(facts.get("TIME"), Some("12:05"));
        assert_eq!(facts.get("YEAR"), Some("2024"));
        assert_eq!(facts.get("FILEBASENAME"), Some("ContentView"));
        assert_eq!(facts.get("PACKAGENAMEASIDENTIFIER"), Some("Demo_App"));
    }

    #[test]
    fn flag_organization_beats_config() {
        let mut config = AppConfig::default();
        config.naming.organization_name = Some("Config Org".into());

        let facts = naming_facts(&args(), &config, noon());
        assert_eq!(facts.get("ORGANIZATIONNAME"), Some("Config Org"));

        let mut flagged = args();
        flagged.organization = Some("Flag Org".into());
        let facts = naming_facts(&flagged, &config, noon());
        assert_eq!(facts.get("ORGANIZATIONNAME"), Some("Flag Org"));
        assert_eq!(
            facts.get("COPYRIGHT"),
            Some("Copyright © 2024 Flag Org. All rights reserved.")
        );
    }

    #[test]
    fn fact_overrides_win() {
        let mut overridden = args();
        overridden.fact = vec![("YEAR".into(), "1999".into())];
        let facts = naming_facts(&overridden, &AppConfig::default(), noon());
        assert_eq!(facts.get("YEAR"), Some("1999"));
    }
}
