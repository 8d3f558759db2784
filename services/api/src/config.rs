use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// Provider API keys are deliberately absent: they are supplied by the
/// client per session and never live in server configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub chat_model: String,
    pub openai_api_base: String,
    pub speech_model: String,
    pub speech_endpoint: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let openai_api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1/".to_string());

        let speech_model =
            std::env::var("SPEECH_MODEL").unwrap_or_else(|_| "nova-2-general".to_string());
        let speech_endpoint = std::env::var("SPEECH_ENDPOINT")
            .unwrap_or_else(|_| "wss://api.deepgram.com/v1/listen".to_string());
        if !speech_endpoint.starts_with("ws://") && !speech_endpoint.starts_with("wss://") {
            return Err(ConfigError::InvalidValue(
                "SPEECH_ENDPOINT".to_string(),
                format!("'{}' is not a ws:// or wss:// URL", speech_endpoint),
            ));
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            chat_model,
            openai_api_base,
            speech_model,
            speech_endpoint,
            log_level,
        })
    }
}
