//! Implementation of the `forma tokens` command.

use forma_core::domain::VariableTokenizer;
use forma_core::domain::variables::TokenView;
use forma_core::error::FormaError;

use crate::{
    cli::{OutputFormat, TokensArgs},
    error::CliResult,
    output::OutputManager,
};

/// Print the token stream of `args.text`.
pub fn execute(args: TokensArgs, output: &OutputManager) -> CliResult<()> {
    let stream = VariableTokenizer::new()
        .tokenize(&args.text)
        .map_err(FormaError::from)?;
    let views: Vec<TokenView<'_>> = stream.iter().map(TokenView::from).collect();

    if output.format() == OutputFormat::Json {
        return output.json(&views);
    }

    for view in &views {
        let mut line = format!("{:>5}  {:<11}  {:?}", view.offset, view.kind, view.raw);
        if let Some(name) = view.name {
            line.push_str(&format!("  name={name}"));
        }
        if !view.transforms.is_empty() {
            line.push_str(&format!("  transforms={}", view.transforms.join(",")));
        }
        output.data(&line)?;
    }
    Ok(())
}
