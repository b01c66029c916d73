//! namecloud: create Cloudflare zones for Namecheap domains and move them to
//! Cloudflare Registrar.
//!
//! Layers:
//! - `domain`: entities and pure rules (no I/O)
//! - `application`: the point and transfer workflows
//! - `infrastructure`: provider API clients, I/O traits, DI container
//! - `cli`: argument parsing, dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
