//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::{ApiError, InfraError};

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Bootstrap { source, .. }) => match source {
                ApiError::InvalidCredentials { .. } => exitcode::CONFIG,
                _ => exitcode::UNAVAILABLE,
            },
            CliError::Infra(InfraError::Application(e)) => application_exit_code(e),
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::MissingDomain
        | ApplicationError::Domain(DomainError::InvalidTransferOptions(_)) => exitcode::USAGE,
        ApplicationError::Domain(_)
        | ApplicationError::DomainNotFound(_)
        | ApplicationError::ZoneNotFound(_)
        | ApplicationError::BlankAuthCode
        | ApplicationError::InvalidAuthCode { .. } => exitcode::DATAERR,
        ApplicationError::AuthCodeInput(_) => exitcode::NOINPUT,
        ApplicationError::Api { .. } | ApplicationError::Unsuccessful { .. } => {
            exitcode::UNAVAILABLE
        }
        ApplicationError::RolledBack { .. }
        | ApplicationError::LeftUnlocked { .. }
        | ApplicationError::WhoisUnprotected { .. } => exitcode::SOFTWARE,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::OperationFailed { .. } => exitcode::IOERR,
    }
}
