use url::Url;

/// Scheme used by the offline store; such URIs never reach the network.
pub const OFFLINE_SCHEME: &str = "offline";

/// `true` if `uri` points into the offline store.
pub fn is_offline_uri(uri: &str) -> bool {
    match Url::parse(uri) {
        Ok(url) => url.scheme() == OFFLINE_SCHEME,
        // Relative references have no scheme of their own.
        Err(_) => uri
            .split_once(':')
            .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case(OFFLINE_SCHEME)),
    }
}

/// Append `query` to `uri` with `?` or `&`.
///
/// Returns `uri` unchanged when `query` is empty or `uri` is an offline URI. A
/// fragment, if any, stays at the end.
pub fn append_query_to_uri(uri: &str, query: &str) -> String {
    if query.is_empty() || is_offline_uri(uri) {
        return uri.to_owned();
    }

    let (base, fragment) = match uri.find('#') {
        Some(idx) => uri.split_at(idx),
        None => (uri, ""),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}{fragment}")
}
