//! Error types for Plant Assist.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Completion error: {0}")]
    Llm(#[from] LlmError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("OTP error: {0}")]
    Otp(#[from] OtpError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Completion-provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Realtime-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Write to {path} failed: {reason}")]
    Write { path: String, reason: String },

    #[error("Read from {path} failed: {reason}")]
    Read { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Identity-provider errors. The message carries the provider's own error
/// text, which the registration flow surfaces verbatim.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Email lookup failed: {0}")]
    Lookup(String),

    #[error("Account creation failed: {0}")]
    CreateAccount(String),

    #[error("Email verification dispatch failed: {0}")]
    Verification(String),
}

/// Object-storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload to {path} failed: {reason}")]
    Upload { path: String, reason: String },

    #[error("No download URL returned for {0}")]
    MissingUrl(String),
}

/// Mail relay errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP relay error: {0}")]
    Relay(String),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Failed to send: {0}")]
    Send(String),
}

/// OTP dispatch errors (the client side of the OTP backend).
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("OTP backend rejected the request with status {status}")]
    Backend { status: u16 },

    #[error("OTP backend unreachable: {0}")]
    Transport(String),
}

/// Registration workflow errors. Validation variants are surfaced before any
/// remote call is attempted.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Please enter a valid email address.")]
    EmailRequired,

    #[error("This email is already in use.")]
    EmailInUse,

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Failed to send OTP. Please try again.")]
    OtpSendFailed(#[source] OtpError),

    #[error("Invalid OTP. Please try again.")]
    InvalidOtp,

    #[error("Please verify your email first.")]
    NotVerified,

    #[error("All fields are required.")]
    MissingField { field: &'static str },

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("{0}")]
    Identity(#[from] IdentityError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
