use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL poster paths are appended to
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Telegram bot token
    pub telegram_bot_token: String,

    /// Telegram Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Shared secret Telegram echoes back in `X-Telegram-Bot-Api-Secret-Token`
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Public base URL of this service; when set the webhook is registered at startup
    #[serde(default)]
    pub public_url: Option<String>,

    /// PostgreSQL connection URL. Preferences are kept in memory when absent.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Inactivity timeout of the preferences menu, in seconds
    #[serde(default = "default_dialog_timeout_secs")]
    pub dialog_timeout_secs: u64,

    /// Minimum number of movies the recommendation search tries to collect
    #[serde(default = "default_min_recommendations")]
    pub min_recommendations: usize,

    /// Maximum number of movies sent back per /recommend
    #[serde(default = "default_max_results_shown")]
    pub max_results_shown: usize,

    /// Language stored with preferences and used for catalog queries
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_dialog_timeout_secs() -> u64 {
    60
}

fn default_min_recommendations() -> usize {
    20
}

fn default_max_results_shown() -> usize {
    20
}

fn default_language() -> String {
    "en".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn dialog_timeout(&self) -> Duration {
        Duration::from_secs(self.dialog_timeout_secs)
    }
}
