use std::path::PathBuf;

use log::debug;

const DEFAULT_QUESTION_BANK: &str = "data/questions.json";
const DEFAULT_DIALOGUE_DB: &str = "db.sqlite";
const DEFAULT_DOCS_BASE_URL: &str = "https://docs.streamlit.io/develop/api-reference";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is set but empty")]
    Empty { name: &'static str },
    #[error("DOCS_BASE_URL must be an http(s) URL, got `{0}`")]
    BadDocsUrl(String),
}

/// Runtime settings. The bot token itself is read by `Bot::from_env` (`TELOXIDE_TOKEN`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub question_bank: PathBuf,
    pub dialogue_db: String,
    pub docs_base_url: String,
}

impl Config {
    /// Loads `.env` if there is one, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenv::dotenv() {
            debug!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str, default: &str| match lookup(name) {
            None => Ok(default.to_string()),
            Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { name }),
            Some(value) => Ok(value.trim().to_string()),
        };

        let docs_base_url = read("DOCS_BASE_URL", DEFAULT_DOCS_BASE_URL)?;
        if !(docs_base_url.starts_with("http://") || docs_base_url.starts_with("https://")) {
            return Err(ConfigError::BadDocsUrl(docs_base_url));
        }

        Ok(Self {
            question_bank: PathBuf::from(read("QUESTION_BANK", DEFAULT_QUESTION_BANK)?),
            dialogue_db: read("DIALOGUE_DB", DEFAULT_DIALOGUE_DB)?,
            docs_base_url: docs_base_url.trim_end_matches('/').to_string(),
        })
    }
}
