//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "forma",
    bin_name = "forma",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Template inheritance resolver and placeholder engine",
    long_about = "Forma resolves template descriptors through their ancestor \
                  chains, merges them, and substitutes ___PLACEHOLDER___ tokens.",
    after_help = "EXAMPLES:\n\
        \x20 forma -t ./templates list\n\
        \x20 forma -t ./templates resolve com.acme.app\n\
        \x20 forma -t ./templates render com.acme.app --set productName=Demo --file-name main.swift\n\
        \x20 forma tokens '___VARIABLE_productName:identifier___.swift'",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List template descriptors.
    #[command(
        visible_alias = "ls",
        about = "List template descriptors",
        after_help = "EXAMPLES:\n\
            \x20 forma list\n\
            \x20 forma list --all --format json"
    )]
    List(ListArgs),

    /// Resolve and merge one template.
    #[command(
        about = "Resolve a template through its ancestors",
        after_help = "EXAMPLES:\n\
            \x20 forma resolve com.acme.app\n\
            \x20 forma resolve com.acme.app --chain"
    )]
    Resolve(ResolveArgs),

    /// Resolve every concrete template and report broken chains.
    #[command(about = "Check that every concrete template resolves")]
    Check,

    /// Substitute every field of a resolved template.
    #[command(
        about = "Build a generation plan for a template",
        after_help = "EXAMPLES:\n\
            \x20 forma render com.acme.app --set productName=Demo\n\
            \x20 forma render com.acme.file --file-name View.swift --set language=Swift"
    )]
    Render(RenderArgs),

    /// Show how a string is tokenized.
    #[command(
        about = "Print the placeholder tokens of a string",
        after_help = "EXAMPLES:\n\
            \x20 forma tokens '___FILEBASENAME___.h'\n\
            \x20 forma tokens --output-format json '___UUID:main___'"
    )]
    Tokens(TokensArgs),

    /// Inspect the Forma configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 forma config show\n\
            \x20 forma config get naming.organization_name\n\
            \x20 forma config path"
    )]
    Config(ConfigCommands),
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `forma list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Include abstract (non-concrete) templates.
    #[arg(long = "all", help = "Show abstract templates too")]
    pub all: bool,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One identifier per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── resolve ───────────────────────────────────────────────────────────────────

/// Arguments for `forma resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Template identifier.
    #[arg(value_name = "ID", help = "Template identifier")]
    pub identifier: String,

    /// Print only the ancestor chain.
    #[arg(long = "chain", help = "Print the ancestor chain only")]
    pub chain: bool,
}

// ── render ────────────────────────────────────────────────────────────────────

/// Arguments for `forma render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template identifier.
    #[arg(value_name = "ID", help = "Template identifier")]
    pub identifier: String,

    /// Option value, repeatable.
    #[arg(
        short = 's',
        long = "set",
        value_name = "OPTION=VALUE",
        value_parser = parse_key_value,
        help = "Set an option value"
    )]
    pub set: Vec<(String, String)>,

    /// Naming fact override, repeatable.
    #[arg(
        long = "fact",
        value_name = "NAME=VALUE",
        value_parser = parse_key_value,
        help = "Override a naming fact (e.g. DATE=2024-01-01)"
    )]
    pub fact: Vec<(String, String)>,

    #[arg(long = "file-name", value_name = "NAME", help = "Value of FILENAME")]
    pub file_name: Option<String>,

    #[arg(long = "package-name", value_name = "NAME", help = "Value of PACKAGENAME")]
    pub package_name: Option<String>,

    #[arg(long = "project-name", value_name = "NAME", help = "Value of PROJECTNAME")]
    pub project_name: Option<String>,

    #[arg(long = "product-name", value_name = "NAME", help = "Value of PRODUCTNAME")]
    pub product_name: Option<String>,

    #[arg(long = "target-name", value_name = "NAME", help = "Value of TARGETNAME")]
    pub target_name: Option<String>,

    #[arg(
        long = "organization",
        value_name = "NAME",
        help = "Value of ORGANIZATIONNAME (defaults to config)"
    )]
    pub organization: Option<String>,

    /// Print the plan and exit 0 even when substitution failed.
    #[arg(long = "allow-errors", help = "Do not fail on substitution errors")]
    pub allow_errors: bool,
}

// ── tokens ────────────────────────────────────────────────────────────────────

/// Arguments for `forma tokens`.
#[derive(Debug, Args)]
pub struct TokensArgs {
    /// Text to tokenize.
    #[arg(value_name = "TEXT", help = "Text containing placeholders")]
    pub text: String,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `forma config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `naming.organization_name`.
        key: String,
    },
    /// Print all configuration values.
    #[command(visible_alias = "list")]
    Show,
    /// Print the path to the default configuration file.
    Path,
}

// ── value parsers ─────────────────────────────────────────────────────────────

/// Parse `KEY=VALUE`. The value may be empty or contain further `=`.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ── tests ─────────────────────────────────────────────────────────────────────
