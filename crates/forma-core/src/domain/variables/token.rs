//! Token model produced by the tokenizer.

use std::fmt;

use serde::Serialize;

use super::transform::Transform;

/// Opening and closing marker of a placeholder.
pub const DELIMITER: &str = "___";

/// Classified placeholder (or literal span).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableToken {
    Literal(String),
    /// Zero-argument macro such as `FILEHEADER`.
    Macro(String),
    /// Built-in naming fact such as `FILEBASENAME`.
    Simple(String),
    Transformed(String, Vec<Transform>),
    /// `VARIABLE_<identifier>` with optional transforms.
    OptionRef(String, Vec<Transform>),
    /// `UUID:<identifier>`.
    Uuid(String),
}

impl VariableToken {
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    pub fn transforms(&self) -> &[Transform] {
        match self {
            Self::Transformed(_, t) | Self::OptionRef(_, t) => t,
            _ => &[],
        }
    }

    /// Short variant label used in diagnostics and the `tokens` command.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Macro(_) => "macro",
            Self::Simple(_) => "simple",
            Self::Transformed(..) => "transformed",
            Self::OptionRef(..) => "option",
            Self::Uuid(_) => "uuid",
        }
    }
}

impl fmt::Display for VariableToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{text:?}"),
            Self::Macro(name) | Self::Simple(name) => f.write_str(name),
            Self::Transformed(name, ts) => {
                f.write_str(name)?;
                write_chain(f, ts)
            }
            Self::OptionRef(id, ts) => {
                write!(f, "VARIABLE_{id}")?;
                write_chain(f, ts)
            }
            Self::Uuid(id) => write!(f, "UUID:{id}"),
        }
    }
}

fn write_chain(f: &mut fmt::Formatter<'_>, transforms: &[Transform]) -> fmt::Result {
    transforms.iter().try_for_each(|t| write!(f, ":{t}"))
}

/// A token plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: VariableToken,
    /// Byte offset of the token's first character in the source text.
    pub offset: usize,
    /// Exact source text, delimiters included for placeholders.
    pub raw: String,
}

/// Ordered tokens for one text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub(crate) fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when nothing needs substituting.
    pub fn is_plain(&self) -> bool {
        self.tokens.iter().all(|t| t.kind.is_literal())
    }

    /// Concatenated raw text; equals the tokenized input.
    pub fn to_source(&self) -> String {
        self.tokens.iter().map(|t| t.raw.as_str()).collect()
    }

    /// Non-literal tokens only.
    pub fn placeholders(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.kind.is_literal())
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Flat view of a token for JSON output.
#[derive(Debug, Serialize)]
pub struct TokenView<'a> {
    pub kind: &'static str,
    pub offset: usize,
    pub raw: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<&'static str>,
}

impl<'a> From<&'a Token> for TokenView<'a> {
    fn from(token: &'a Token) -> Self {
        let name = match &token.kind {
            VariableToken::Literal(_) => None,
            VariableToken::Macro(n)
            | VariableToken::Simple(n)
            | VariableToken::Transformed(n, _)
            | VariableToken::OptionRef(n, _)
            | VariableToken::Uuid(n) => Some(n.as_str()),
        };
        Self {
            kind: token.kind.label(),
            offset: token.offset,
            raw: &token.raw,
            name,
            transforms: token.kind.transforms().iter().map(|t| t.name()).collect(),
        }
    }
}
