//! Token stream -> final text.
//!
//! Failures never abort a field: each failing placeholder is recorded as a
//! [`SubstitutionDiagnostic`] and its raw text is kept in the output, so a
//! caller rendering many fields can report every problem in one pass.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::context::SubstitutionContext;
use super::token::{Token, TokenStream, VariableToken};
use super::tokenizer::VariableTokenizer;
use super::transform::TransformRegistry;
use crate::domain::entities::resolved::ResolvedTemplate;
use crate::domain::error::DomainError;

/// One failed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionDiagnostic {
    /// Field the text came from (e.g. `Nodes[2]`).
    pub field: String,
    pub offset: usize,
    pub token: String,
    pub error: DomainError,
}

impl fmt::Display for SubstitutionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}: {}", self.field, self.offset, self.error)
    }
}

impl Serialize for SubstitutionDiagnostic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("SubstitutionDiagnostic", 4)?;
        s.serialize_field("field", &self.field)?;
        s.serialize_field("offset", &self.offset)?;
        s.serialize_field("token", &self.token)?;
        s.serialize_field("error", &self.error.to_string())?;
        s.end()
    }
}

/// Output of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substituted {
    pub text: String,
    pub diagnostics: Vec<SubstitutionDiagnostic>,
}

impl Substituted {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Text when no placeholder failed, otherwise the diagnostics.
    pub fn into_result(self) -> Result<String, Vec<SubstitutionDiagnostic>> {
        if self.diagnostics.is_empty() {
            Ok(self.text)
        } else {
            Err(self.diagnostics)
        }
    }
}

/// Resolves placeholders against one template and one run's context.
pub struct SubstitutionEngine<'a> {
    template: &'a ResolvedTemplate,
    context: &'a SubstitutionContext,
    tokenizer: VariableTokenizer,
}

impl<'a> SubstitutionEngine<'a> {
    pub fn new(template: &'a ResolvedTemplate, context: &'a SubstitutionContext) -> Self {
        Self {
            template,
            context,
            tokenizer: VariableTokenizer::new(),
        }
    }

    /// Tokenize then substitute `text`.
    ///
    /// A parse error (unknown transform) makes the whole field unusable: the
    /// text is returned unchanged with a single diagnostic.
    pub fn substitute(&self, field: &str, text: &str) -> Substituted {
        match self.tokenizer.tokenize(text) {
            Ok(tokens) => self.substitute_tokens(field, &tokens),
            Err(error) => {
                let (token, offset) = match &error {
                    DomainError::UnknownTransform { token, offset, .. } => (token.clone(), *offset),
                    _ => (text.to_string(), 0),
                };
                Substituted {
                    text: text.to_string(),
                    diagnostics: vec![SubstitutionDiagnostic {
                        field: field.to_string(),
                        offset,
                        token,
                        error,
                    }],
                }
            }
        }
    }

    pub fn substitute_tokens(&self, field: &str, tokens: &TokenStream) -> Substituted {
        let mut text = String::new();
        let mut diagnostics = Vec::new();

        for token in tokens {
            match self.resolve(token) {
                Ok(value) => text.push_str(&value),
                Err(error) => {
                    text.push_str(&token.raw);
                    diagnostics.push(SubstitutionDiagnostic {
                        field: field.to_string(),
                        offset: token.offset,
                        token: token.raw.clone(),
                        error,
                    });
                }
            }
        }

        if !diagnostics.is_empty() {
            debug!(field, failures = diagnostics.len(), "substitution incomplete");
        }
        Substituted { text, diagnostics }
    }

    fn resolve(&self, token: &Token) -> Result<String, DomainError> {
        match &token.kind {
            VariableToken::Literal(text) => Ok(text.clone()),
            VariableToken::Macro(name) | VariableToken::Simple(name) => {
                self.fact(name, token).map(str::to_string)
            }
            VariableToken::Transformed(name, transforms) => {
                let value = self.fact(name, token)?;
                Ok(TransformRegistry::apply_all(transforms, value))
            }
            VariableToken::OptionRef(identifier, transforms) => {
                let value = self.option_value(identifier, token)?;
                Ok(TransformRegistry::apply_all(transforms, value))
            }
            VariableToken::Uuid(identifier) => Ok(self.context.uuids().get_or_generate(identifier)),
        }
    }

    fn fact(&self, name: &str, token: &Token) -> Result<&'a str, DomainError> {
        self.context
            .facts()
            .get(name)
            .ok_or_else(|| DomainError::UnknownVariable {
                token: token.raw.clone(),
                offset: token.offset,
            })
    }

    /// Supplied value, then declared default, then "" for optional options.
    fn option_value(&self, identifier: &str, token: &Token) -> Result<&'a str, DomainError> {
        if let Some(value) = self.context.value(identifier) {
            return Ok(value);
        }

        let Some(option) = self.template.option(identifier) else {
            return Err(DomainError::UnknownVariable {
                token: token.raw.clone(),
                offset: token.offset,
            });
        };

        match (&option.default, option.required) {
            (Some(default), _) => Ok(default.as_str()),
            (None, true) => Err(DomainError::MissingRequiredOption {
                option: identifier.to_string(),
                offset: token.offset,
            }),
            (None, false) => Ok(""),
        }
    }
}
