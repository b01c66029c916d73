//! Domain layer: entities and business rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod name;

pub use entities::*;
pub use error::DomainError;
pub use name::DomainName;
