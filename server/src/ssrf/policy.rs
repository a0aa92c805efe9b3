//! Host lists consulted before any server-side fetch.

use std::sync::LazyLock;

/// Loopback names and cloud instance-metadata endpoints (substring match).
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "127.0.0.1",
    "0.0.0.0",
    "::1",
    // AWS and Azure IMDS
    "169.254.169.254",
    "instance-data",
    // GCP
    "metadata.google.internal",
    // Azure
    "metadata.azure.com",
];

/// Hostname suffixes that only resolve on the local network.
const BLOCKED_SUFFIXES: &[&str] = &[".local"];

/// Domains trusted for scraping when the allow-list is enforced.
const ALLOWED_DOMAINS: &[&str] = &[
    "linkedin.com",
    "github.com",
    "gitlab.com",
    "medium.com",
    "substack.com",
    "dev.to",
];

/// Policy shared by [`is_safe_to_fetch`](super::is_safe_to_fetch) and
/// [`partition`](super::partition).
pub static DEFAULT_POLICY: LazyLock<UrlPolicy> = LazyLock::new(UrlPolicy::default);

/// Host block-lists and the optional allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPolicy {
    /// Lower-case entries rejected on exact or substring match
    pub blocked_hosts: Vec<String>,
    /// Textual private-network prefixes (`10.`, `172.16.` .. `172.31.`, `192.168.`)
    pub blocked_prefixes: Vec<String>,
    /// Rejected hostname suffixes
    pub blocked_suffixes: Vec<String>,
    /// Trusted domains; subdomains match too
    pub allowed_domains: Vec<String>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        let mut blocked_prefixes = vec!["10.".to_string()];
        blocked_prefixes.extend((16..=31).map(|octet| format!("172.{octet}.")));
        blocked_prefixes.push("192.168.".to_string());

        Self {
            blocked_hosts: to_owned(BLOCKED_HOSTS),
            blocked_prefixes,
            blocked_suffixes: to_owned(BLOCKED_SUFFIXES),
            allowed_domains: to_owned(ALLOWED_DOMAINS),
        }
    }
}

impl UrlPolicy {
    /// Built-in lists, with the allow-list replaced by `URL_ALLOWLIST`
    /// (comma-separated domains) when that variable is set and non-empty.
    pub fn from_env() -> Self {
        let mut policy = Self::default();

        if let Ok(val) = std::env::var("URL_ALLOWLIST") {
            let domains: Vec<String> = val
                .split(',')
                .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect();
            if !domains.is_empty() {
                policy.allowed_domains = domains;
            }
        }

        policy
    }

    /// First blocked-host entry that `host` equals or contains.
    pub(crate) fn blocked_host_match(&self, host: &str) -> Option<&str> {
        self.blocked_hosts
            .iter()
            .find(|blocked| host.contains(blocked.as_str()))
            .map(String::as_str)
    }

    /// First private-network prefix `host` starts with.
    pub(crate) fn private_prefix_match(&self, host: &str) -> Option<&str> {
        self.blocked_prefixes
            .iter()
            .find(|prefix| host.starts_with(prefix.as_str()))
            .map(String::as_str)
    }

    /// Whether `host` ends in a local-only suffix.
    pub(crate) fn is_local_domain(&self, host: &str) -> bool {
        self.blocked_suffixes
            .iter()
            .any(|suffix| host.ends_with(suffix.as_str()))
    }

    /// Whether `host` is a trusted domain or one of its subdomains.
    pub(crate) fn is_allowlisted(&self, host: &str) -> bool {
        self.allowed_domains.iter().any(|domain| {
            host == domain.as_str()
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }
}

fn to_owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}
