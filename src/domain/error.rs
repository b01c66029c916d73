//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("you can't transfer an expired domain: {0}")]
    Expired(String),

    #[error(
        "transfer of {name} can not begin until at least 60 days since initial registration, \
         it has only been {days:.2} days"
    )]
    RegistrationTooRecent { name: String, days: f64 },

    #[error("cannot split domain name into label and public suffix: {0}")]
    UnparseableName(String),

    #[error("invalid transfer options: {0}")]
    InvalidTransferOptions(String),
}
