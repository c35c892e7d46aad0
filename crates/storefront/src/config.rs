//! Session configuration loaded from environment variables.

/// Default origin of the store service.
pub const DEFAULT_API_ORIGIN: &str = "https://larek-api.nomoreparties.co";

/// Storefront configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `API_ORIGIN`: store service origin (default: [`DEFAULT_API_ORIGIN`])
/// - `STOREFRONT_TRACE_EVENTS`: log every bus emission when `1`/`true`
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_origin: String,
    pub trace_events: bool,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            api_origin: std::env::var("API_ORIGIN")
                .map(|origin| origin.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_ORIGIN.to_string()),
            trace_events: std::env::var("STOREFRONT_TRACE_EVENTS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Returns the base URL of the JSON API.
    pub fn api_url(&self) -> String {
        format!("{}/api/weblarek", self.api_origin)
    }

    /// Returns the base URL product image paths are relative to.
    pub fn cdn_url(&self) -> String {
        format!("{}/content/weblarek", self.api_origin)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            trace_events: false,
            log_level: "info".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
