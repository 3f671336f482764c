use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables (and `.env`
/// when present). Credentials are required; file paths fall back to
/// defaults in the working directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub google_access_token: String,
    pub characters_csv: PathBuf,
    pub characters_jsonl: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-pro".to_string()),
            google_access_token: require_env("GOOGLE_ACCESS_TOKEN")?,
            characters_csv: history_path("CHARACTERS_CSV", "characters.csv"),
            characters_jsonl: history_path("CHARACTERS_JSONL", "characters.jsonl"),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Resolves a history file path from the environment with a default name
/// in the working directory. Usable without the full config, so `convert`
/// and `history` never demand API credentials.
pub fn history_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
