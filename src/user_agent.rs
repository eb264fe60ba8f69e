//! Request header defaults for download traffic.
//!
//! Report hosts frequently reject non-browser clients, so every request carries
//! a desktop browser User-Agent unless the operator configures another one.

use std::collections::BTreeMap;

/// Header name used for the User-Agent entry in configured header maps.
pub const USER_AGENT_HEADER: &str = "user-agent";

/// Desktop Chrome User-Agent sent with every download request by default.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// Default request headers: only the browser User-Agent.
#[must_use]
pub fn default_request_headers() -> BTreeMap<String, String> {
    BTreeMap::from([(USER_AGENT_HEADER.to_string(), BROWSER_USER_AGENT.to_string())])
}

/// Adds the browser User-Agent when `headers` carries none (case-insensitive).
pub fn ensure_user_agent(headers: &mut BTreeMap<String, String>) {
    let has_user_agent = headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case(USER_AGENT_HEADER));
    if !has_user_agent {
        headers.insert(USER_AGENT_HEADER.to_string(), BROWSER_USER_AGENT.to_string());
    }
}
