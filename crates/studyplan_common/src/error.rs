// --- File: crates/studyplan_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The error type returned by every upstream-facing Studyplan operation.
///
/// Reads mostly degrade instead of failing; writes report `RemoteError` so the
/// caller can tell the user the mutation did not take effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudyplanError {
    /// Bad caller input: capacity, malformed payload, invalid recurrence, ...
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The calendar provider rejected or failed a request
    #[error("Remote error: {0}")]
    RemoteError(String),

    /// The referenced calendar or event does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Errors produced by calendar provider implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The provider understood the request and refused it (4xx).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Network, authentication or server-side failure.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<ProviderError> for StudyplanError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(message) => StudyplanError::NotFound(message),
            other => StudyplanError::RemoteError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StudyplanError {
    fn from(err: serde_json::Error) -> Self {
        StudyplanError::InvalidArgument(err.to_string())
    }
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for StudyplanError {
    fn status_code(&self) -> u16 {
        match self {
            StudyplanError::InvalidArgument(_) => 400,
            StudyplanError::NotFound(_) => 404,
            StudyplanError::RemoteError(_) => 502,
            StudyplanError::ConfigError(_) => 500,
            StudyplanError::InternalError(_) => 500,
        }
    }
}

/// Adds context to foreign errors while converting them.
pub trait Context<T> {
    fn context<C>(self, context: C) -> Result<T, StudyplanError>
    where
        C: fmt::Display;
}

impl<T, E: std::error::Error> Context<T> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, StudyplanError>
    where
        C: fmt::Display,
    {
        self.map_err(|error| StudyplanError::InternalError(format!("{}: {}", context, error)))
    }
}

pub fn invalid_argument<T: fmt::Display>(message: T) -> StudyplanError {
    StudyplanError::InvalidArgument(message.to_string())
}

pub fn remote_error<T: fmt::Display>(message: T) -> StudyplanError {
    StudyplanError::RemoteError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> StudyplanError {
    StudyplanError::NotFound(message.to_string())
}

pub fn config_error<T: fmt::Display>(message: T) -> StudyplanError {
    StudyplanError::ConfigError(message.to_string())
}
