//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::error::ApiError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{context}: {source}")]
    Api {
        context: String,
        #[source]
        source: ApiError,
    },

    #[error("domain name argument is required")]
    MissingDomain,

    #[error("domain not found at registrar: {0}")]
    DomainNotFound(String),

    #[error("no zone found for {0}; run `namecloud point` first")]
    ZoneNotFound(String),

    #[error("failed to read auth code: {0}")]
    AuthCodeInput(#[source] std::io::Error),

    #[error("auth code must not be blank")]
    BlankAuthCode,

    #[error("auth code rejected for {domain}")]
    InvalidAuthCode { domain: String },

    #[error("{action} was not successful for {domain}")]
    Unsuccessful { action: &'static str, domain: String },

    #[error("{cause}; registrar state of {domain} was restored")]
    RolledBack {
        domain: String,
        #[source]
        cause: Box<ApplicationError>,
    },

    #[error("domain {domain} left unlocked: {reason}")]
    LeftUnlocked { domain: String, reason: String },

    #[error("WHOIS information of {domain} left unprotected: {reason}")]
    WhoisUnprotected { domain: String, reason: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
