//! Reasons a URL is refused for server-side fetching.

use thiserror::Error;

/// The rule that rejected a URL, with the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlRejection {
    /// Not a syntactically valid absolute URL.
    #[error("malformed URL: {url}")]
    Malformed { url: String },
    /// Any scheme other than `https`.
    #[error("scheme `{scheme}` is not allowed, only https")]
    Scheme { scheme: String },
    /// Hostname matches a loopback or cloud-metadata entry.
    #[error("host `{host}` matches blocked entry `{pattern}`")]
    BlockedHost { host: String, pattern: String },
    /// Hostname starts with a private-network prefix.
    #[error("host `{host}` is in private range `{prefix}`")]
    PrivateNetwork { host: String, prefix: String },
    /// Hostname ends in a local-only suffix.
    #[error("host `{host}` is a local domain")]
    LocalDomain { host: String },
    /// Allow-list mode is on and the host is not a trusted domain.
    #[error("host `{host}` is not on the allow-list")]
    NotAllowlisted { host: String },
}

impl UrlRejection {
    /// Short identifier for structured logs.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed_url",
            Self::Scheme { .. } => "scheme",
            Self::BlockedHost { .. } => "blocked_host",
            Self::PrivateNetwork { .. } => "private_network",
            Self::LocalDomain { .. } => "local_domain",
            Self::NotAllowlisted { .. } => "not_allowlisted",
        }
    }
}
