//! URL normalization and host helpers.
//!
//! The normalized form is the dedup key for reports and the blacklist:
//! lowercase, no scheme, no leading `www.`, no query, no fragment and no
//! trailing slash. `normalize_url` is idempotent.

use url::Url;

/// Domains whose URLs are reported safe without any lookup.
/// Subdomains of these hosts are trusted as well.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "google.com",
    "youtube.com",
    "facebook.com",
    "instagram.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
    "github.com",
    "wikipedia.org",
    "paypal.com",
    "linkedin.com",
    "twitter.com",
    "x.com",
    "zalo.me",
    "shopee.vn",
    "tiki.vn",
    "vnexpress.net",
    "gov.vn",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("URL is not valid: {0}")]
    Invalid(String),
}

/// Normalize a URL into its dedup key.
pub fn normalize_url(raw: &str) -> Result<String, UrlError> {
    let mut current = raw.to_string();
    loop {
        let next = normalize_once(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        return Err(UrlError::Empty);
    }
    if current.chars().any(char::is_whitespace) {
        return Err(UrlError::Invalid(raw.trim().to_string()));
    }

    Ok(current)
}

fn normalize_once(input: &str) -> String {
    let mut s = input.trim().to_lowercase();

    if let Some(idx) = s.find("://") {
        if is_scheme(&s[..idx]) {
            s = s[idx + 3..].to_string();
        }
    }

    if let Some(idx) = s.find('#') {
        s.truncate(idx);
    }
    if let Some(idx) = s.find('?') {
        s.truncate(idx);
    }

    let mut s = s.as_str();
    while let Some(rest) = s.strip_prefix("www.") {
        s = rest;
    }

    s.trim_end_matches('/').trim().to_string()
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Parse user input into an absolute URL, assuming `http://` when no scheme
/// was given.
pub fn parse_absolute(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Invalid(format!("{}: {}", trimmed, e)))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::Invalid(trimmed.to_string()));
    }

    Ok(url)
}

/// Host of a parsed URL, lowercased and without a leading `www.`.
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(|h| {
        let host = h.to_lowercase();
        host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
    })
}

/// Exact match or subdomain of a trusted domain. Look-alike hosts such as
/// `paypal.com.evil.io` do not match.
pub fn is_trusted_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_lowercase();
    TRUSTED_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .map_or(false, |prefix| prefix.ends_with('.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_www_slash_query_and_fragment() {
        assert_eq!(
            normalize_url("HTTPS://www.Example.com/Login/?next=/home#top").unwrap(),
            "example.com/login"
        );
        assert_eq!(normalize_url("http://example.com/").unwrap(), "example.com");
        assert_eq!(normalize_url("example.com").unwrap(), "example.com");
        assert_eq!(normalize_url("  ftp://files.example.com//  ").unwrap(), "files.example.com");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "https://www.www.example.com/a/b/?x=1",
            "http://example.com/path/http://other.com",
            "WWW.Shop-Sale.xyz///",
            "https://bank-verify.top/login#step2",
            "example.com /",
        ];

        for input in inputs {
            if let Ok(once) = normalize_url(input) {
                assert_eq!(normalize_url(&once).unwrap(), once, "input: {}", input);
            }
        }
    }

    #[test]
    fn nested_scheme_in_path_is_kept() {
        assert_eq!(
            normalize_url("http://example.com/path/http://other.com").unwrap(),
            "example.com/path/http://other.com"
        );
    }

    #[test]
    fn empty_urls_are_rejected() {
        assert_eq!(normalize_url("   "), Err(UrlError::Empty));
        assert_eq!(normalize_url("https://www./"), Err(UrlError::Empty));
        assert_eq!(normalize_url("https://?q=1"), Err(UrlError::Empty));
    }

    #[test]
    fn parse_absolute_adds_missing_scheme() {
        let url = parse_absolute("example.com/login").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(host_of(&url).as_deref(), Some("example.com"));

        let url = parse_absolute("https://www.GitHub.com").unwrap();
        assert_eq!(host_of(&url).as_deref(), Some("github.com"));
    }

    #[test]
    fn trusted_hosts_match_exact_and_subdomains_only() {
        assert!(is_trusted_host("google.com"));
        assert!(is_trusted_host("mail.google.com"));
        assert!(is_trusted_host("dichvucong.gov.vn"));
        assert!(!is_trusted_host("paypal.com.evil.io"));
        assert!(!is_trusted_host("notgoogle.com"));
        assert!(!is_trusted_host("google.com-login.xyz"));
    }
}
