// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hostname normalization and the credential-to-page matching heuristic.

use url::Url;

/// Reduce a hostname to its last two labels after stripping a leading `www.`.
///
/// Hostnames with two labels or fewer are returned unchanged.
pub fn root_domain(hostname: &str) -> String {
    let host = hostname.strip_prefix("www.").unwrap_or(hostname);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host.to_string();
    }
    labels[labels.len() - 2..].join(".")
}

/// Same as [`root_domain`].
pub fn registered_domain(hostname: &str) -> String {
    root_domain(hostname)
}

/// Hostname of `url`, assuming `https://` when no scheme is given.
///
/// Returns `None` when the string does not parse as a URL with a host.
pub fn hostname(url: &str) -> Option<String> {
    let parsed = if url.contains("://") {
        Url::parse(url)
    } else {
        Url::parse(&format!("https://{url}"))
    };
    parsed.ok()?.host_str().map(str::to_string)
}

/// Whether a stored credential with `url` and `title` belongs to `page_domain`.
///
/// The URL is tried first: its registered domain matches when either it or
/// `page_domain` is a suffix of the other. An unparseable URL falls back to
/// case-insensitive substring containment in either direction. If the URL
/// does not match, or is empty, the title is compared the same way. An
/// empty `page_domain` matches nothing, and neither does a URL whose host
/// reduces to an empty domain (`https://www.`).
pub fn matches(url: &str, title: &str, page_domain: &str) -> bool {
    let page = page_domain.to_lowercase();
    if page.is_empty() {
        return false;
    }

    if !url.is_empty() {
        let url_match = match hostname(url) {
            Some(host) => {
                let credential_domain = registered_domain(&host);
                !credential_domain.is_empty()
                    && (page.ends_with(&credential_domain) || credential_domain.ends_with(&page))
            }
            None => contains_either_way(&url.to_lowercase(), &page),
        };
        if url_match {
            return true;
        }
    }

    !title.is_empty() && contains_either_way(&title.to_lowercase(), &page)
}

fn contains_either_way(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_domain_keeps_last_two_labels() {
        assert_eq!(root_domain("example.com"), "example.com");
        assert_eq!(root_domain("www.example.com"), "example.com");
        assert_eq!(root_domain("a.b.example.com"), "example.com");
        assert_eq!(root_domain("localhost"), "localhost");
    }

    #[test]
    fn empty_root_domain_matches_no_page() {
        assert_eq!(hostname("https://www.").as_deref(), Some("www."));
        assert_eq!(root_domain("www."), "");
        assert!(!matches("https://www.", "", "bank.com"));
        assert!(!matches("https://www.", "", "example.org"));
        assert!(matches("https://www.", "Bank", "bank.com"));
    }

    #[test]
    fn root_domain_is_not_suffix_aware() {
        assert_eq!(root_domain("www.example.co.uk"), "co.uk");
        assert_eq!(registered_domain("www.example.co.uk"), "co.uk");
    }

    #[test]
    fn hostname_assumes_https() {
        assert_eq!(hostname("github.com/login").as_deref(), Some("github.com"));
        assert_eq!(
            hostname("https://Accounts.Example.com:8443/x").as_deref(),
            Some("accounts.example.com")
        );
        assert_eq!(hostname("not a url"), None);
    }

    #[test]
    fn subdomain_url_matches_parent_page() {
        assert!(matches("https://sub.example.com", "", "example.com"));
        assert!(matches("https://example.com", "", "login.example.com"));
        assert!(matches("example.com", "", "EXAMPLE.COM"));
    }

    #[test]
    fn unrelated_url_does_not_match() {
        assert!(!matches("https://example.com", "", "example.org"));
        assert!(!matches("https://bank.com", "Bank", "phish.net"));
    }

    #[test]
    fn unparseable_url_falls_back_to_substring() {
        assert!(matches("my example.com login", "", "example.com"));
        assert!(!matches("my example.com login", "", "other.org"));
    }

    #[test]
    fn title_is_used_when_url_misses_or_is_empty() {
        assert!(matches("https://other.org", "example.com", "example.com"));
        assert!(matches("", "Example.com account", "example.com"));
        assert!(!matches("", "Mail", "example.com"));
    }

    #[test]
    fn nothing_to_compare_never_matches() {
        assert!(!matches("", "", "example.com"));
        assert!(!matches("https://example.com", "Example", ""));
    }

    proptest! {
        #[test]
        fn root_domain_has_at_most_two_labels(labels in prop::collection::vec("[a-z]{1,8}", 1..6)) {
            let host = labels.join(".");
            let root = root_domain(&host);
            prop_assert!(root.split('.').count() <= 2);
            prop_assert!(host.ends_with(&root));
        }
    }
}
