//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (Registrar, ZoneProvider, Prompt, Clock)
//! but are themselves concrete structs, not traits.

mod point;
mod transfer;

pub use point::{PointFailure, PointReport, PointService};
pub use transfer::TransferService;
