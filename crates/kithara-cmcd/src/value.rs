use std::fmt::{self, Write as _};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped by `encodeURIComponent`: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub(crate) const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub(crate) fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// A single formatted CMCD value.
///
/// Every field picks its variant explicitly, so the serializer never has to guess
/// whether a value is a token, a string or a number.
#[derive(Clone, Debug, PartialEq)]
pub enum CmcdValue {
    /// Whole number, written as `key=123`.
    Integer(i64),
    /// Number with a possible fraction, written as `key=1.5`.
    Decimal(f64),
    /// Free text, written as `key="..."` with JSON string escaping.
    Quoted(String),
    /// Text that is percent-encoded first and then quoted (`nor`).
    UrlSafe(String),
    /// Enumerated token, written unquoted (`ot`, `sf`, `st`).
    Token(String),
    /// Boolean `true`, written as the bare key.
    Flag,
}

impl CmcdValue {
    /// `false` for values that must not be transmitted.
    #[must_use]
    pub fn is_meaningful(&self) -> bool {
        match self {
            Self::Decimal(v) => v.is_finite(),
            Self::Quoted(s) | Self::UrlSafe(s) | Self::Token(s) => !s.is_empty(),
            Self::Integer(_) | Self::Flag => true,
        }
    }

    pub(crate) fn write_token(&self, key: &str, out: &mut String) -> fmt::Result {
        match self {
            Self::Flag => out.write_str(key),
            Self::Integer(v) => write!(out, "{key}={v}"),
            Self::Decimal(v) => write!(out, "{key}={}", format_decimal(*v)),
            Self::Token(v) => write!(out, "{key}={v}"),
            Self::Quoted(v) => write!(out, "{key}={}", quote(v)),
            Self::UrlSafe(v) => write!(out, "{key}={}", quote(&encode_uri_component(v))),
        }
    }
}

fn quote(value: &str) -> String {
    // Serializing a plain str cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

#[expect(clippy::cast_possible_truncation)]
fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
