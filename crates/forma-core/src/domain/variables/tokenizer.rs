//! Placeholder lexer.
//!
//! One left-to-right pass splits a field into literal spans and classified
//! placeholders. Scanning is lenient: source text routinely contains `___`
//! runs that are not placeholders, so an unknown body or a missing closing
//! delimiter degrades to literal text instead of failing. The only parse
//! error is a recognised head followed by a transform name that does not
//! exist.
//!
//! Every token keeps its raw text, so [`TokenStream::to_source`] always
//! reproduces the input byte for byte.

use super::facts::{BUILTIN_NAMES, MACRO_NAMES};
use super::token::{DELIMITER, Token, TokenStream, VariableToken};
use super::transform::{Transform, TransformRegistry};
use crate::domain::error::DomainError;

/// Body prefix of an option reference.
pub const OPTION_PREFIX: &str = "VARIABLE_";

/// Body prefix of a UUID placeholder (followed by `:`).
pub const UUID_PREFIX: &str = "UUID";

/// Stateless; share freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableTokenizer;

impl VariableTokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Split `input` into tokens.
    ///
    /// # Errors
    /// `UnknownTransform` when a built-in or option placeholder names a
    /// transform that is not registered.
    pub fn tokenize(&self, input: &str) -> Result<TokenStream, DomainError> {
        let mut scan = Scan::new(input);

        while let Some(open) = scan.next_delimiter() {
            let body_start = open + DELIMITER.len();
            let Some(close) = input[body_start..]
                .find(DELIMITER)
                .map(|rel| body_start + rel)
            else {
                // Unterminated: the remainder stays literal.
                break;
            };

            let end = close + DELIMITER.len();
            let raw = &input[open..end];
            match classify(&input[body_start..close], raw, open)? {
                Some(kind) => scan.emit(open, end, kind),
                // Not a placeholder: both delimiters stay literal and are
                // never reused to open another token.
                None => scan.skip_to(end),
            }
        }

        Ok(scan.finish())
    }
}

/// Convenience wrapper over [`VariableTokenizer::tokenize`].
pub fn tokenize(input: &str) -> Result<TokenStream, DomainError> {
    VariableTokenizer.tokenize(input)
}

struct Scan<'a> {
    input: &'a str,
    /// Next byte to search from.
    cursor: usize,
    /// Start of the pending literal span.
    literal_start: usize,
    tokens: Vec<Token>,
}

impl<'a> Scan<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: 0,
            literal_start: 0,
            tokens: Vec::new(),
        }
    }

    fn next_delimiter(&self) -> Option<usize> {
        self.input[self.cursor..]
            .find(DELIMITER)
            .map(|rel| self.cursor + rel)
    }

    fn skip_to(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    fn emit(&mut self, start: usize, end: usize, kind: VariableToken) {
        self.flush_literal(start);
        self.tokens.push(Token {
            kind,
            offset: start,
            raw: self.input[start..end].to_string(),
        });
        self.cursor = end;
        self.literal_start = end;
    }

    fn flush_literal(&mut self, until: usize) {
        if until > self.literal_start {
            let text = &self.input[self.literal_start..until];
            self.tokens.push(Token {
                kind: VariableToken::Literal(text.to_string()),
                offset: self.literal_start,
                raw: text.to_string(),
            });
        }
        self.literal_start = until;
    }

    fn finish(mut self) -> TokenStream {
        self.flush_literal(self.input.len());
        TokenStream::from_tokens(self.tokens)
    }
}

/// Classify a placeholder body. `Ok(None)` means "not a placeholder".
fn classify(body: &str, raw: &str, offset: usize) -> Result<Option<VariableToken>, DomainError> {
    if let Some(rest) = body.strip_prefix(OPTION_PREFIX) {
        let mut segments = rest.split(':');
        let identifier = segments.next().unwrap_or_default();
        if !is_identifier(identifier) {
            return Ok(None);
        }
        let transforms = parse_transforms(segments, raw, offset)?;
        return Ok(Some(VariableToken::OptionRef(identifier.to_string(), transforms)));
    }

    if let Some(identifier) = body
        .strip_prefix(UUID_PREFIX)
        .and_then(|rest| rest.strip_prefix(':'))
    {
        if !is_identifier(identifier) {
            return Ok(None);
        }
        return Ok(Some(VariableToken::Uuid(identifier.to_string())));
    }

    match body.split_once(':') {
        None if MACRO_NAMES.contains(&body) => Ok(Some(VariableToken::Macro(body.to_string()))),
        None if BUILTIN_NAMES.contains(&body) => Ok(Some(VariableToken::Simple(body.to_string()))),
        Some((head, rest)) if BUILTIN_NAMES.contains(&head) => {
            let transforms = parse_transforms(rest.split(':'), raw, offset)?;
            Ok(Some(VariableToken::Transformed(head.to_string(), transforms)))
        }
        _ => Ok(None),
    }
}

fn parse_transforms<'s>(
    segments: impl Iterator<Item = &'s str>,
    raw: &str,
    offset: usize,
) -> Result<Vec<Transform>, DomainError> {
    segments
        .map(|name| {
            TransformRegistry::lookup(name).ok_or_else(|| DomainError::UnknownTransform {
                transform: name.to_string(),
                token: raw.to_string(),
                offset,
            })
        })
        .collect()
}

/// Option and UUID identifiers: word characters only.
fn is_identifier(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<VariableToken> {
        tokenize(input)
            .unwrap()
            .iter()
            .map(|t| t.kind.clone())
            .collect()
    }

    fn lit(s: &str) -> VariableToken {
        VariableToken::Literal(s.to_string())
    }

    #[test]
    fn plain_text_is_one_literal() {
        assert_eq!(kinds("no placeholders here"), [lit("no placeholders here")]);
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn classifies_every_body_form() {
        assert_eq!(
            kinds("___FILEHEADER______FILEBASENAME______PROJECTNAME:identifier:upper___"),
            [
                VariableToken::Macro("FILEHEADER".into()),
                VariableToken::Simple("FILEBASENAME".into()),
                VariableToken::Transformed(
                    "PROJECTNAME".into(),
                    vec![Transform::Identifier, Transform::Upper]
                ),
            ]
        );
        assert_eq!(
            kinds("___VARIABLE_name:upper___.txt"),
            [
                VariableToken::OptionRef("name".into(), vec![Transform::Upper]),
                lit(".txt"),
            ]
        );
        assert_eq!(kinds("___UUID:svc___"), [VariableToken::Uuid("svc".into())]);
    }

    #[test]
    fn records_offsets_and_raw_text() {
        let stream = tokenize("ab___FILENAME___cd").unwrap();
        let tokens = stream.tokens();
        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[0].offset, tokens[0].raw.as_str()), (0, "ab"));
        assert_eq!((tokens[1].offset, tokens[1].raw.as_str()), (2, "___FILENAME___"));
        assert_eq!((tokens[2].offset, tokens[2].raw.as_str()), (16, "cd"));
    }

    #[test]
    fn unknown_body_stays_literal() {
        assert_eq!(kinds("let ___private___ = 1;"), [lit("let ___private___ = 1;")]);
        assert_eq!(kinds("______"), [lit("______")]);
        assert_eq!(kinds("___UUID:___"), [lit("___UUID:___")]);
        assert_eq!(kinds("___VARIABLE_bad name___"), [lit("___VARIABLE_bad name___")]);
    }

    #[test]
    fn delimiters_of_unknown_body_are_not_reused() {
        assert_eq!(kinds("___junk___FILENAME___"), [lit("___junk___FILENAME___")]);
        assert_eq!(kinds("____FILENAME___"), [lit("____FILENAME___")]);
        assert_eq!(
            kinds("___junk___ ___FILENAME___"),
            [lit("___junk___ "), VariableToken::Simple("FILENAME".into())]
        );
    }

    #[test]
    fn malformed_uuid_identifier_stays_literal() {
        assert_eq!(kinds("___UUID:a b:c___"), [lit("___UUID:a b:c___")]);
        assert_eq!(kinds("___UUID:x:y___"), [lit("___UUID:x:y___")]);
        assert_eq!(kinds("___UUID:app_target2___"), [VariableToken::Uuid("app_target2".into())]);
    }

    #[test]
    fn unterminated_token_is_flushed_as_literal() {
        assert_eq!(kinds("x ___FILENAME"), [lit("x ___FILENAME")]);
        assert_eq!(
            kinds("___YEAR___ and ___DATE"),
            [VariableToken::Simple("YEAR".into()), lit(" and ___DATE")]
        );
    }

    #[test]
    fn unknown_transform_is_a_parse_error() {
        let err = tokenize("see ___PROJECTNAME:shout___").unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownTransform {
                transform: "shout".into(),
                token: "___PROJECTNAME:shout___".into(),
                offset: 4,
            }
        );

        assert!(matches!(
            tokenize("___VARIABLE_x:Upper___"),
            Err(DomainError::UnknownTransform { transform, .. }) if transform == "Upper"
        ));
    }

    #[test]
    fn transforms_on_unknown_heads_are_not_parsed() {
        // Unknown head: literal, even though the transform name is bogus too.
        assert_eq!(kinds("___NOPE:shout___"), [lit("___NOPE:shout___")]);
    }

    #[test]
    fn transform_order_is_preserved() {
        let stream = tokenize("___VARIABLE_id:upper:identifier:lower___").unwrap();
        assert_eq!(
            stream.tokens()[0].kind.transforms(),
            [Transform::Upper, Transform::Identifier, Transform::Lower]
        );
    }

    #[test]
    fn round_trips_to_source() {
        for input in [
            "___FILEHEADER___\nimport ___VARIABLE_module___\n",
            "a____b___FILENAME____c___",
            "___UUID:svc___-___UUID:svc___",
            "trailing ___",
            "ünïcödé ___YEAR___ ✓",
        ] {
            assert_eq!(tokenize(input).unwrap().to_source(), input);
        }
    }
}
