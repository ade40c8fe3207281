//! Configuration types, built from environment variables.
//!
//! Each component has its own config struct with a `from_env` constructor.
//! Credentials never live in source; the completion bearer key is wrapped in
//! `secrecy::SecretString` so it cannot leak through Debug output.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default chat-completions endpoint.
pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Fine-tuned eggplant model used by the chat workflow.
pub const DEFAULT_COMPLETION_MODEL: &str =
    "ft:gpt-4o-2024-08-06:comsats-university-islamabad:eggplant:AXBw13d2";

/// Completion-service configuration.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Full URL of the chat-completions endpoint.
    pub api_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature. Kept low to favor deterministic, on-topic replies.
    pub temperature: f32,
    /// Bearer credential, read from `OPENAI_API_KEY`.
    pub api_key: SecretString,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl CompletionConfig {
    /// Build config from environment variables.
    /// Fails if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".into()))?;

        let api_url = std::env::var("PLANT_ASSIST_COMPLETION_URL")
            .unwrap_or_else(|_| DEFAULT_COMPLETION_URL.to_string());

        let model = std::env::var("PLANT_ASSIST_MODEL")
            .unwrap_or_else(|_| DEFAULT_COMPLETION_MODEL.to_string());

        let temperature: f32 = std::env::var("PLANT_ASSIST_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.2);

        let timeout_secs: u64 = std::env::var("PLANT_ASSIST_COMPLETION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            api_url,
            model,
            temperature,
            api_key: SecretString::from(api_key),
            timeout_secs,
        })
    }
}

/// SMTP relay configuration for the OTP backend.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl SmtpConfig {
    /// Build config from environment variables.
    /// Fails if `SMTP_HOST` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("SMTP_HOST")
            .map_err(|_| ConfigError::MissingEnvVar("SMTP_HOST".into()))?;

        let port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_address =
            std::env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Ok(Self {
            host,
            port,
            username,
            password,
            from_address,
        })
    }
}

/// Firebase project configuration (realtime database, auth, object storage).
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Realtime database base URL, e.g. `https://<project>.firebaseio.com`.
    pub database_url: String,
    /// Web API key for the identity-toolkit REST endpoints.
    pub api_key: String,
    /// Storage bucket name for profile-image uploads.
    pub storage_bucket: String,
}

impl FirebaseConfig {
    /// Build config from environment variables.
    /// Fails if `FIREBASE_DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("FIREBASE_DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("FIREBASE_DATABASE_URL".into()))?;
        let api_key = std::env::var("FIREBASE_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("FIREBASE_API_KEY".into()))?;
        let storage_bucket = std::env::var("FIREBASE_STORAGE_BUCKET").unwrap_or_default();

        Ok(Self {
            database_url: database_url.trim_end_matches('/').to_string(),
            api_key,
            storage_bucket,
        })
    }
}

/// OTP backend server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the OTP backend listens on.
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PLANT_ASSIST_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        Self { port }
    }
}
