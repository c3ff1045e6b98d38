//! Centralized error types for skycheck.
//!
//! Every variant carries full context for logs and offers a short
//! `user_message()` for display.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(e) => e.user_message().to_string(),
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Weather(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// User-facing message for the first typed error found in `err`'s chain.
pub fn user_message_for(err: &anyhow::Error) -> String {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<AppError>() {
            return e.user_message();
        }
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return e.user_message().to_string();
        }
        if cause.is::<std::io::Error>() {
            return "A file operation failed. Please try again.".to_string();
        }
    }
    "An unexpected error occurred. Please try again.".to_string()
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Weather lookup outcomes as seen by the user.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("No weather found for {0}")]
    NoResults(String),
}

impl WeatherError {
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::NoResults(location) => format!("No weather found for {}", location),
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

/// Errors raised while building the fetch layer.
impl From<skycheck_weather::WeatherError> for AppError {
    fn from(e: skycheck_weather::WeatherError) -> Self {
        use skycheck_weather::WeatherError as Fetch;
        match e {
            Fetch::Network(e) => AppError::Network(e.into_network_error()),
            Fetch::Url(e) => AppError::Config(ConfigError::Invalid(e.to_string())),
            other => AppError::Other(other.into()),
        }
    }
}
