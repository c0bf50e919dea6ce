use std::{collections::BTreeMap, sync::Arc};

use crate::{types::CmcdKey, value::CmcdValue};

/// Source of session ids, invoked once per manager when no id is configured.
pub type SessionIdProvider = Arc<dyn Fn() -> String + Send + Sync>;

/// CMCD configuration.
#[derive(Clone)]
pub struct CmcdOptions {
    /// When `false`, every apply call leaves its input untouched.
    pub enabled: bool,
    /// Deliver as `CMCD-*` headers instead of the `CMCD` query parameter.
    pub use_headers: bool,
    /// Session id; generated with `session_id_provider` when `None`.
    pub session_id: Option<String>,
    /// Content id shared by every request of the session.
    pub content_id: Option<String>,
    /// When set, only these reserved keys are transmitted.
    pub include_keys: Option<Vec<CmcdKey>>,
    /// Vendor keys attached to every payload.
    pub custom_keys: BTreeMap<String, CmcdValue>,
    pub session_id_provider: SessionIdProvider,
}

impl Default for CmcdOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            use_headers: false,
            session_id: None,
            content_id: None,
            include_keys: None,
            custom_keys: BTreeMap::new(),
            session_id_provider: Arc::new(|| uuid::Uuid::new_v4().to_string()),
        }
    }
}

impl std::fmt::Debug for CmcdOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmcdOptions")
            .field("enabled", &self.enabled)
            .field("use_headers", &self.use_headers)
            .field("session_id", &self.session_id)
            .field("content_id", &self.content_id)
            .field("include_keys", &self.include_keys)
            .field("custom_keys", &self.custom_keys)
            .field("session_id_provider", &"SessionIdProvider")
            .finish()
    }
}

impl CmcdOptions {
    /// Enabled options with query delivery.
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_headers(mut self, use_headers: bool) -> Self {
        self.use_headers = use_headers;
        self
    }

    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_content_id<S: Into<String>>(mut self, content_id: S) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn with_include_keys(mut self, keys: Vec<CmcdKey>) -> Self {
        self.include_keys = Some(keys);
        self
    }

    /// Add a vendor key. Names need a hyphenated reverse-DNS prefix (`com.example-name`);
    /// keys without one, and `Token` values containing separators, are not transmitted.
    pub fn with_custom_key<S: Into<String>>(mut self, key: S, value: CmcdValue) -> Self {
        self.custom_keys.insert(key.into(), value);
        self
    }

    pub fn with_session_id_provider(mut self, provider: SessionIdProvider) -> Self {
        self.session_id_provider = provider;
        self
    }

    pub(crate) fn resolve_session_id(&self) -> String {
        self.session_id
            .clone()
            .unwrap_or_else(|| (self.session_id_provider)())
    }
}
