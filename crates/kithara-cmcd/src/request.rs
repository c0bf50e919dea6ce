use std::collections::BTreeMap;

use crate::error::{CmcdError, CmcdResult};

/// Outbound request header mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    inner: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Copy every entry of `other` into `self`, replacing existing values.
    pub fn extend(&mut self, other: Headers) {
        self.inner.extend(other.inner);
    }

    /// Fail on the first value that is not a legal HTTP field value.
    pub fn validate(&self) -> CmcdResult<()> {
        match self.iter().find(|(_, value)| !is_field_value(value)) {
            Some((name, value)) => Err(CmcdError::InvalidHeaderValue {
                name: name.to_owned(),
                value: value.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

// Visible ASCII, space and tab.
fn is_field_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b == b'\t' || (b' '..=b'~').contains(&b))
}

/// The parts of an outbound request CMCD may touch.
///
/// A request can carry several equivalent URIs (mirrors); each one is rewritten
/// independently in query mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub uris: Vec<String>,
    pub headers: Headers,
}

impl Request {
    pub fn new<S: Into<String>>(uri: S) -> Self {
        Self {
            uris: vec![uri.into()],
            headers: Headers::new(),
        }
    }

    pub fn with_uris<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uris: uris.into_iter().map(Into::into).collect(),
            headers: Headers::new(),
        }
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key, value);
        self
    }
}
