//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Errors raised by the provider API clients.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} API error: {message}")]
    Provider {
        provider: &'static str,
        code: Option<String>,
        message: String,
    },

    #[error("failed to decode {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("invalid {provider} credentials: {message}")]
    InvalidCredentials {
        provider: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn decode(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            provider,
            message: message.into(),
        }
    }

    /// Provider-specific error code, if the provider reported one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Provider { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Result type for provider API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Infrastructure errors wrap application errors and add bootstrap concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{context}: {source}")]
    Bootstrap {
        context: String,
        #[source]
        source: ApiError,
    },
}

impl InfraError {
    /// Create a bootstrap error with context.
    pub fn bootstrap(context: impl Into<String>, source: ApiError) -> Self {
        Self::Bootstrap {
            context: context.into(),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
