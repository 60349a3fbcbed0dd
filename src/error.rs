//! Error types per data concern
//!
//! These never reach a reducer directly: async handlers render them into
//! user-facing messages carried by failure events.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CountryError {
    #[error("Couldn't refresh the country list. Please try again.")]
    RemoteUnavailable,

    #[error("Country not found: {code}")]
    NotFound { code: String },
}

#[derive(Debug, Error, Clone)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("An account with this email already exists.")]
    EmailAlreadyRegistered,

    #[error("The verification code is incorrect.")]
    InvalidVerificationCode,

    #[error("This verification session has expired. Request a new code.")]
    UnknownVerification,

    #[error("The authentication service is unavailable. Please try again.")]
    ServiceUnavailable,
}

#[derive(Debug, Error, Clone)]
pub enum ImageError {
    #[error("Couldn't load images. Please try again.")]
    Unavailable,

    #[error("Image not found: {id}")]
    NotFound { id: i64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
