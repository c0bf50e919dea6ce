//! CTA-5004 wire syntax.
//!
//! A payload is rendered as a comma-joined token list sorted by key name. The same
//! rendering is used for every header group and, percent-encoded, for the `CMCD`
//! query parameter.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::{
    data::CmcdData,
    error::{CmcdError, CmcdResult},
    request::Headers,
    types::{CmcdKey, HeaderGroup},
    value::{CmcdValue, encode_uri_component},
};

/// Name of the query parameter carrying the full payload.
pub const QUERY_PARAM: &str = "CMCD";

/// Render `data` as `key=value,key,...`, keys in lexicographic order.
#[must_use]
pub fn serialize(data: &CmcdData) -> String {
    serialize_entries(&data.entries())
}

fn serialize_entries(entries: &[(String, CmcdValue)]) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        if !out.is_empty() {
            out.push(',');
        }
        // Writing into a String never fails.
        let _ = value.write_token(key, &mut out);
    }
    out
}

/// Split `data` into the four header groups. Empty groups produce no header.
#[must_use]
pub fn to_headers(data: &CmcdData) -> Headers {
    let mut groups: BTreeMap<HeaderGroup, Vec<(String, CmcdValue)>> = BTreeMap::new();
    for (key, value) in data.entries() {
        groups
            .entry(HeaderGroup::for_key_name(&key))
            .or_default()
            .push((key, value));
    }

    let mut headers = Headers::new();
    for group in HeaderGroup::ALL {
        let Some(entries) = groups.get(&group) else {
            continue;
        };
        let value = serialize_entries(entries);
        if !value.is_empty() {
            headers.insert(group.header_name(), value);
        }
    }
    headers
}

/// `CMCD=<percent-encoded payload>`, or an empty string when nothing is transmittable.
#[must_use]
pub fn to_query(data: &CmcdData) -> String {
    let cmcd = serialize(data);
    if cmcd.is_empty() {
        return String::new();
    }
    format!("{QUERY_PARAM}={}", encode_uri_component(&cmcd))
}

/// Parse serialized CMCD text back into key/value pairs, in input order.
///
/// Quoted values are unescaped, bare keys become [`CmcdValue::Flag`], numbers become
/// [`CmcdValue::Integer`] or [`CmcdValue::Decimal`], anything else is a token.
pub fn parse(input: &str) -> CmcdResult<Vec<(String, CmcdValue)>> {
    let mut out = Vec::new();
    if input.is_empty() {
        return Ok(out);
    }

    for token in split_tokens(input)? {
        let (key, raw) = match token.split_once('=') {
            Some((key, raw)) => (key, Some(raw)),
            None => (token, None),
        };
        if key.is_empty() {
            return Err(CmcdError::Decode(format!("missing key in `{token}`")));
        }
        let value = match raw {
            None => CmcdValue::Flag,
            Some(raw) => parse_value(key, raw)?,
        };
        out.push((key.to_owned(), value));
    }
    Ok(out)
}

/// Extract and parse the `CMCD` parameter from a query string.
///
/// Accepts the bare `CMCD=...` produced by [`to_query`] as well as a longer query
/// (optionally with a leading `?`) that contains it.
pub fn decode_query(query: &str) -> CmcdResult<Vec<(String, CmcdValue)>> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let payload = form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| CmcdError::Decode(format!("no `{QUERY_PARAM}` parameter")))?;
    parse(&payload)
}

fn split_tokens(input: &str) -> CmcdResult<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                tokens.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(CmcdError::Decode("unterminated quoted string".into()));
    }
    tokens.push(&input[start..]);
    Ok(tokens)
}

fn parse_value(key: &str, raw: &str) -> CmcdResult<CmcdValue> {
    if raw.is_empty() {
        return Err(CmcdError::Decode(format!("empty value for `{key}`")));
    }

    if raw.starts_with('"') {
        let text: String = serde_json::from_str(raw)
            .map_err(|e| CmcdError::Decode(format!("bad string for `{key}`: {e}")))?;
        if CmcdKey::from_name(key) == Some(CmcdKey::NextObjectRequest) {
            let decoded = percent_decode_str(&text)
                .decode_utf8()
                .map_err(|e| CmcdError::Decode(format!("bad `nor` encoding: {e}")))?;
            return Ok(CmcdValue::UrlSafe(decoded.into_owned()));
        }
        return Ok(CmcdValue::Quoted(text));
    }

    if let Ok(v) = raw.parse::<i64>() {
        return Ok(CmcdValue::Integer(v));
    }
    if let Ok(v) = raw.parse::<f64>()
        && v.is_finite()
    {
        return Ok(CmcdValue::Decimal(v));
    }
    Ok(CmcdValue::Token(raw.to_owned()))
}
