//! URL normalization and the dedup key derived from it.

use sha2::{Digest, Sha256};

/// Normalizes an article URL for deduplication.
///
/// Lowercases the scheme and host, trims surrounding whitespace, and strips
/// trailing slashes from the path. Query strings and fragments are kept
/// verbatim, so `?id=1` and `?id=2` remain distinct articles.
///
/// Inputs without a `scheme://` prefix are treated as host + path.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (Some(scheme.to_ascii_lowercase()), rest),
        None => (None, trimmed),
    };

    let host_end = rest.find(&['/', '?', '#'][..]).unwrap_or(rest.len());
    let (host, tail) = rest.split_at(host_end);
    let host = host.to_ascii_lowercase();

    let suffix_start = tail.find(&['?', '#'][..]).unwrap_or(tail.len());
    let (path, suffix) = tail.split_at(suffix_start);
    let path = path.trim_end_matches('/');

    let mut normalized = String::with_capacity(trimmed.len());
    if let Some(scheme) = scheme {
        normalized.push_str(&scheme);
        normalized.push_str("://");
    }
    normalized.push_str(&host);
    normalized.push_str(path);
    normalized.push_str(suffix);
    normalized
}

/// SHA-256 of the normalized URL as lowercase hex. Pure: the same logical URL
/// always yields the same 64-character key.
#[must_use]
pub fn url_hash(url: &str) -> String {
    let digest = Sha256::digest(normalize_url(url).as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_scheme_and_host_only() {
        assert_eq!(
            normalize_url("HTTPS://TechCrunch.COM/2024/OpenAI-Raises"),
            "https://techcrunch.com/2024/OpenAI-Raises"
        );
    }

    #[test]
    fn strips_trailing_slashes() {
        assert_eq!(
            normalize_url("https://example.com/news/"),
            "https://example.com/news"
        );
        assert_eq!(normalize_url("https://example.com//"), "https://example.com");
    }

    #[test]
    fn strips_trailing_slash_before_query() {
        assert_eq!(
            normalize_url("https://example.com/a/?utm=x"),
            "https://example.com/a?utm=x"
        );
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            normalize_url("  https://example.com/a \n"),
            "https://example.com/a"
        );
    }

    #[test]
    fn host_without_path_and_query() {
        assert_eq!(
            normalize_url("https://Example.com?x=1"),
            "https://example.com?x=1"
        );
    }

    #[test]
    fn schemeless_input_is_normalized_as_host_path() {
        assert_eq!(normalize_url("Example.com/a/"), "example.com/a");
    }

    #[test]
    fn hash_is_stable_and_hex() {
        let h1 = url_hash("https://example.com/a");
        let h2 = url_hash("https://example.com/a");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn equivalent_urls_share_a_hash() {
        assert_eq!(
            url_hash("HTTPS://EXAMPLE.com/story/"),
            url_hash("https://example.com/story")
        );
    }

    #[test]
    fn different_paths_have_different_hashes() {
        assert_ne!(
            url_hash("https://example.com/a"),
            url_hash("https://example.com/b")
        );
    }
}
