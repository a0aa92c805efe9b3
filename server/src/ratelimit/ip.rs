//! Client IP extraction for anonymous rate limit subjects.

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::ratelimit::{IPV6_PREFIX_SEGMENTS, IP_SUBJECT_PREFIX};

/// Parses the first address out of a proxy header, if present and valid.
fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}

/// Extract client IP from request headers or connection info.
///
/// When `trust_proxy` is true, `X-Forwarded-For` then `X-Real-IP` are
/// consulted. Falls back to the peer address, or 127.0.0.1 if unavailable.
pub fn extract_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> IpAddr {
    if trust_proxy {
        if let Some(ip) =
            header_ip(headers, "X-Forwarded-For").or_else(|| header_ip(headers, "X-Real-IP"))
        {
            return ip;
        }
    }
    connect_info
        .map(|c| c.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Normalize IP address for rate limiting.
///
/// IPv6 addresses collapse to their /64 so one allocation counts as one
/// caller.
pub fn normalize_ip(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => {
            let seg = v6.segments();
            let prefix: Vec<String> = seg[..IPV6_PREFIX_SEGMENTS]
                .iter()
                .map(|s| format!("{s:x}"))
                .collect();
            format!("{}::/64", prefix.join(":"))
        }
    }
}

/// Rate limit subject for a caller without an authenticated identity.
pub fn ip_subject(normalized_ip: &str) -> String {
    format!("{IP_SUBJECT_PREFIX}{normalized_ip}")
}
