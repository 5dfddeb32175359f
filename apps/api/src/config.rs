use anyhow::{Context, Result};

const DEFAULT_COMPLETION_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
const DEFAULT_SESSION_IDLE_SECS: u32 = 4 * 60 * 60;

/// Application configuration loaded from environment variables.
/// Everything has a default; a missing completion key only disables suggestions.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub completion_api_key: Option<String>,
    pub completion_api_url: String,
    pub completion_model: String,
    /// Sessions unedited for this long are dropped; 0 keeps them forever.
    pub session_idle_secs: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            completion_api_key: optional_env("COMPLETION_API_KEY"),
            completion_api_url: optional_env("COMPLETION_API_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_API_URL.to_string()),
            completion_model: optional_env("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            session_idle_secs: optional_env("SESSION_IDLE_SECS")
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("SESSION_IDLE_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_SESSION_IDLE_SECS),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            completion_api_key: None,
            completion_api_url: DEFAULT_COMPLETION_API_URL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }
}

/// Unset and blank values both read as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
