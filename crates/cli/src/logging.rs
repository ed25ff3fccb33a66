//! Logging setup
//!
//! Logs go to stderr; stdout is reserved for the JSON result.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str =
    "burp_headless=info,burp_headless_core=info,burp_headless_infra_system=info";

/// Initialize tracing
///
/// # Environment Variables
///
/// - `RUST_LOG`: filter directives (default: info for this tool's crates)
/// - `BURP_HEADLESS_LOG_FORMAT`: `json`, `pretty`, or `compact` (default)
pub fn init() {
    let log_format =
        std::env::var("BURP_HEADLESS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        "pretty" => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }
}
