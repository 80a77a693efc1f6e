//! Browser-like request identity for feed fetches.
//!
//! Forum feed providers throttle or block obvious bot user agents, so the
//! fetch presents itself as a common desktop browser.

use rand::prelude::*;

/// Default user agents if none are configured.
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Pick a random user agent from the configured pool or defaults.
pub fn pick_user_agent(pool: Option<&[String]>) -> String {
    let mut rng = thread_rng();

    match pool.and_then(|agents| agents.choose(&mut rng)) {
        Some(agent) => agent.clone(),
        None => DEFAULT_USER_AGENTS
            .choose(&mut rng)
            .copied()
            .unwrap_or(DEFAULT_USER_AGENTS[0])
            .to_string(),
    }
}

/// Build the header set sent with every feed request.
///
/// `Accept-Encoding` is left to the HTTP client, which advertises exactly
/// the decoders it was built with (gzip, deflate, br).
pub fn build_headers(user_agent: &str) -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), user_agent.to_string()),
        ("Accept".to_string(), "text/html".to_string()),
        ("Accept-Language".to_string(), "en".to_string()),
        ("Cache-Control".to_string(), "no-cache".to_string()),
        ("DNT".to_string(), "1".to_string()),
    ]
}
