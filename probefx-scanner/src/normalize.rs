//! URL normalization and same-site host derivation shared by the crawler and
//! the transaction client.

use url::Url;

/// Returns `true` when `raw` already names an `http://` or `https://` URL.
pub fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Prefixes `http://` when the input carries no http(s) scheme.
pub fn with_default_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Normalizes a URL for de-duplication.
///
/// The scheme defaults to `http`, the fragment is dropped and trailing slashes
/// are removed unless the URL carries a query, so `example.com`, `http://example.com/` and
/// `http://example.com/#top` all map to `http://example.com`. Returns `None`
/// for empty input or anything that does not parse as an absolute URL.
///
/// Normalizing an already normalized URL returns it unchanged.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut url = Url::parse(&with_default_scheme(trimmed)).ok()?;
    url.set_fragment(None);

    let has_query = url.query().is_some();
    let serialized: String = url.into();
    // a slash at the end of a query is part of a parameter value
    let normalized = if has_query {
        serialized.as_str()
    } else {
        serialized.trim_end_matches('/')
    };
    if normalized.is_empty() {
        return None;
    }
    Some(normalized.to_string())
}

/// Host used for same-site comparison: the URL's host with any leading
/// `www.` removed, lowercased.
pub fn site_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }
    match host.strip_prefix("www.") {
        Some(stripped) => Some(stripped.to_string()),
        None => Some(host),
    }
}

/// Two URLs are same-site when their derived hosts match, ignoring case.
pub fn is_same_site(a: &str, b: &str) -> bool {
    match (site_host(a), site_host(b)) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(&b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults_scheme() {
        assert_eq!(
            normalize_url("example.com/about").as_deref(),
            Some("http://example.com/about")
        );
    }

    #[test]
    fn test_normalize_strips_fragment_and_trailing_slash() {
        let expected = Some("http://example.com/docs".to_string());
        assert_eq!(normalize_url("http://example.com/docs/"), expected);
        assert_eq!(normalize_url("http://example.com/docs#intro"), expected);
        assert_eq!(normalize_url("http://example.com/docs/#intro"), expected);
        assert_eq!(normalize_url("example.com/docs"), expected);
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(
            normalize_url("https://example.com/").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            normalize_url("https://example.com").as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_normalize_keeps_query() {
        assert_eq!(
            normalize_url("http://example.com/search?q=1#results").as_deref(),
            Some("http://example.com/search?q=1")
        );
    }

    #[test]
    fn test_normalize_keeps_slash_inside_query() {
        assert_eq!(
            normalize_url("http://a.com/?next=/").as_deref(),
            Some("http://a.com/?next=/")
        );
        assert_eq!(
            normalize_url("http://a.com/docs/?next=/home/").as_deref(),
            Some("http://a.com/docs/?next=/home/")
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "example.com",
            "http://example.com//",
            "https://Example.com/a/b/",
            "http://example.com/a?x=1#frag",
            "http://example.com/?next=/",
            "http://www.example.com:8080/path/",
            "  http://example.com/padded/  ",
        ];
        for input in inputs {
            let once = normalize_url(input).unwrap();
            let twice = normalize_url(&once).unwrap();
            assert_eq!(once, twice, "normalization not idempotent for {}", input);
        }
    }

    #[test]
    fn test_normalize_rejects_empty_and_garbage() {
        assert_eq!(normalize_url(""), None);
        assert_eq!(normalize_url("   "), None);
        assert_eq!(normalize_url("http://"), None);
        assert_eq!(normalize_url("not a url at all"), None);
    }

    #[test]
    fn test_site_host_strips_www() {
        assert_eq!(
            site_host("http://www.example.com/page").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            site_host("http://api.example.com").as_deref(),
            Some("api.example.com")
        );
        assert_eq!(site_host("not a url"), None);
    }

    #[test]
    fn test_is_same_site() {
        assert!(is_same_site("http://www.Example.com/a", "https://example.COM/b"));
        assert!(!is_same_site("http://example.com", "http://other.com"));
        assert!(!is_same_site("http://example.com", "garbage"));
    }

    #[test]
    fn test_with_default_scheme() {
        assert_eq!(with_default_scheme("example.com"), "http://example.com");
        assert_eq!(with_default_scheme("HTTPS://example.com"), "HTTPS://example.com");
        assert_eq!(with_default_scheme(" https://x.io "), "https://x.io");
    }
}
