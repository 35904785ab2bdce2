//! Named string transforms applied to variable values.
//!
//! The set is closed: templates name a transform, they never supply code.
//! Names are case-sensitive. A token's transforms run left to right, each
//! consuming the previous output.

use std::fmt;

/// One named, pure `String -> String` function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Language identifier: invalid runs become `_`, leading digit gets a `_` prefix.
    Identifier,
    /// DNS label: lowercase, non-alphanumeric runs become `-`, trimmed.
    Rfc1034Identifier,
    /// Reverse-DNS: per dot-segment RFC 1034 cleanup, empty segments dropped.
    BundleIdentifier,
    Lower,
    Upper,
    /// Escape for XML / property-list text.
    Xml,
}

/// Lookup table of transform names (canonical names first, then aliases).
pub struct TransformRegistry;

impl TransformRegistry {
    const TABLE: &'static [(&'static str, Transform)] = &[
        ("identifier", Transform::Identifier),
        ("rfc1034Identifier", Transform::Rfc1034Identifier),
        ("bundleIdentifier", Transform::BundleIdentifier),
        ("lower", Transform::Lower),
        ("upper", Transform::Upper),
        ("xml", Transform::Xml),
        ("c99ExtIdentifier", Transform::Identifier),
        ("RFC1034Identifier", Transform::Rfc1034Identifier),
        ("lowercase", Transform::Lower),
        ("uppercase", Transform::Upper),
    ];

    /// Transform registered under `name` (exact, case-sensitive match).
    pub fn lookup(name: &str) -> Option<Transform> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| *t)
    }

    /// Every accepted name, aliases included.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::TABLE.iter().map(|(n, _)| *n)
    }

    /// Apply `transforms` left to right.
    pub fn apply_all(transforms: &[Transform], value: &str) -> String {
        transforms
            .iter()
            .fold(value.to_string(), |acc, t| t.apply(&acc))
    }
}

impl Transform {
    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Rfc1034Identifier => "rfc1034Identifier",
            Self::BundleIdentifier => "bundleIdentifier",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Xml => "xml",
        }
    }

    pub fn apply(self, input: &str) -> String {
        match self {
            Self::Identifier => to_identifier(input),
            Self::Rfc1034Identifier => to_rfc1034(input),
            Self::BundleIdentifier => to_bundle_identifier(input),
            Self::Lower => input.to_lowercase(),
            Self::Upper => input.to_uppercase(),
            Self::Xml => escape_xml(input),
        }
    }

    /// Whether `apply(apply(x)) == apply(x)` holds for every input.
    pub fn is_idempotent(self) -> bool {
        matches!(self, Self::Identifier | Self::Lower | Self::Upper)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn to_identifier(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 1);
    let mut in_invalid_run = false;

    for c in input.chars() {
        if is_identifier_char(c) {
            out.push(c);
            in_invalid_run = false;
        } else if !in_invalid_run {
            out.push('_');
            in_invalid_run = true;
        }
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Lowercase, collapse non-alphanumeric runs to one `-`, trim `-`.
fn to_rfc1034(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

fn to_bundle_identifier(input: &str) -> String {
    input
        .split('.')
        .map(to_rfc1034)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
