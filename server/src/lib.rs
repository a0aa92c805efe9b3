//! Outreach Server
//!
//! Backend guards for the outreach message generator: sliding-window rate
//! limiting for AI generation, checkout, and general API traffic, plus
//! SSRF-safe validation of user-supplied URLs before any scrape.

pub mod api;
pub mod config;
pub mod observability;
pub mod ratelimit;
pub mod ssrf;
