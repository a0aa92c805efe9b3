//! URL checks run before any server-side scrape.
//!
//! Rules apply in a fixed order and the first failure wins: parse, scheme,
//! blocked host, private prefix, local suffix, then the optional allow-list.
//! Host checks are textual on the hostname as written; alternate numeric
//! encodings that the parser does not canonicalize are not caught.

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::policy::{UrlPolicy, DEFAULT_POLICY};
use super::UrlRejection;

/// URLs split by verdict, each bucket in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionedUrls {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

impl UrlPolicy {
    /// Applies every rule to `url`, returning the parsed URL when safe.
    pub fn evaluate(&self, url: &str, enforce_allowlist: bool) -> Result<Url, UrlRejection> {
        let parsed = Url::parse(url).map_err(|_| UrlRejection::Malformed {
            url: url.to_string(),
        })?;

        if parsed.scheme() != "https" {
            return Err(UrlRejection::Scheme {
                scheme: parsed.scheme().to_string(),
            });
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| UrlRejection::Malformed {
                url: url.to_string(),
            })?
            .to_ascii_lowercase();

        if let Some(pattern) = self.blocked_host_match(&host) {
            return Err(UrlRejection::BlockedHost {
                pattern: pattern.to_string(),
                host,
            });
        }

        if let Some(prefix) = self.private_prefix_match(&host) {
            return Err(UrlRejection::PrivateNetwork {
                prefix: prefix.to_string(),
                host,
            });
        }

        if self.is_local_domain(&host) {
            return Err(UrlRejection::LocalDomain { host });
        }

        if enforce_allowlist && !self.is_allowlisted(&host) {
            return Err(UrlRejection::NotAllowlisted { host });
        }

        Ok(parsed)
    }

    /// Whether `url` may be fetched from server-side code.
    ///
    /// Every rejection is logged with its reason and the offending value.
    pub fn is_safe_to_fetch(&self, url: &str, enforce_allowlist: bool) -> bool {
        match self.evaluate(url, enforce_allowlist) {
            Ok(_) => {
                debug!(url = %url, "URL passed SSRF checks");
                true
            }
            Err(rejection) => {
                warn!(
                    reason = rejection.reason(),
                    url = %url,
                    detail = %rejection,
                    "Blocked unsafe URL"
                );
                false
            }
        }
    }

    /// Splits `urls` into safe and unsafe, preserving order within each bucket.
    pub fn partition<S: AsRef<str>>(&self, urls: &[S], enforce_allowlist: bool) -> PartitionedUrls {
        let mut out = PartitionedUrls::default();
        for url in urls {
            let url = url.as_ref();
            if self.is_safe_to_fetch(url, enforce_allowlist) {
                out.valid.push(url.to_string());
            } else {
                out.invalid.push(url.to_string());
            }
        }
        out
    }
}

/// [`UrlPolicy::is_safe_to_fetch`] with the built-in lists.
pub fn is_safe_to_fetch(url: &str, enforce_allowlist: bool) -> bool {
    DEFAULT_POLICY.is_safe_to_fetch(url, enforce_allowlist)
}

/// [`UrlPolicy::partition`] with the built-in lists.
pub fn partition<S: AsRef<str>>(urls: &[S], enforce_allowlist: bool) -> PartitionedUrls {
    DEFAULT_POLICY.partition(urls, enforce_allowlist)
}

/// Hostname of `url` for logging, or `None` if it does not parse.
pub fn extract_hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}
