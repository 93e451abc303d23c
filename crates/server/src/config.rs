use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub catalogue_path: String,
    pub host: String,
    pub port: u16,
    pub default_ply_limit: usize,
    pub report_limit: usize,
    pub callback_url: Option<String>,
    pub callback_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            catalogue_path: lookup("CATALOGUE_PATH").unwrap_or_else(|| "data/openings".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(8000),
            default_ply_limit: lookup("DEFAULT_PLY_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(40),
            report_limit: lookup("REPORT_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(opening_classifier::options::DEFAULT_REPORT_LIMIT),
            callback_url: lookup("CALLBACK_URL").filter(|v| !v.trim().is_empty()),
            callback_timeout_secs: lookup("CALLBACK_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }

    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_secs)
    }
}
