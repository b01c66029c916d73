//! I/O boundary traits for testability
//!
//! These traits abstract the two provider APIs, the operator prompt and the
//! system clock, allowing the workflows to be tested with fake implementations.
//! Each trait covers exactly the calls the workflows make.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::domain::{
    Account, DomainName, DomainSummary, RegistrarDomain, TransferRequest, Zone,
};
use crate::infrastructure::error::ApiResult;

/// Domain registrar (Namecheap) operations.
pub trait Registrar: Send + Sync {
    /// List every domain owned by the account.
    fn list_domains(&self) -> ApiResult<Vec<DomainSummary>>;

    /// Look up domain detail by name.
    /// Returns None if the registrar does not know the domain.
    fn get_domain(&self, name: &str) -> ApiResult<Option<RegistrarDomain>>;

    /// Lock or unlock the domain. Returns the registrar's success flag.
    fn set_registrar_lock(&self, name: &str, locked: bool) -> ApiResult<bool>;

    /// Re-enable WHOIS guard, forwarding mail to `forward_to`.
    fn enable_whois_guard(&self, guard_id: &str, forward_to: &str) -> ApiResult<bool>;

    /// Disable WHOIS guard.
    fn disable_whois_guard(&self, guard_id: &str) -> ApiResult<bool>;

    /// Replace the domain's nameservers with a comma-separated list.
    /// Returns the registrar's `Updated` flag.
    fn set_custom_nameservers(&self, domain: &DomainName, nameservers: &str) -> ApiResult<bool>;
}

/// DNS zone and registrar-transfer provider (Cloudflare) operations.
pub trait ZoneProvider: Send + Sync {
    /// Resolve the account context for an account id.
    fn account(&self, account_id: &str) -> ApiResult<Account>;

    /// List zones of the account, optionally filtered by exact name.
    fn list_zones(&self, account: &Account, name: Option<&str>) -> ApiResult<Vec<Zone>>;

    /// Create a zone of the given plan type.
    fn create_zone(&self, account: &Account, name: &str, zone_type: &str) -> ApiResult<Zone>;

    /// Ask the provider whether an EPP/auth code is valid for the domain.
    fn check_auth_code(&self, account: &Account, domain: &str, auth_code: &str)
        -> ApiResult<bool>;

    /// Start the registrar transfer. Returns the provider's success flag.
    fn transfer_domain(&self, zone: &Zone, request: &TransferRequest) -> ApiResult<bool>;
}

/// Interactive line input.
pub trait Prompt: Send + Sync {
    /// Show `message` and block until the operator enters one line.
    /// The returned line has its trailing line break removed.
    fn read_line(&self, message: &str) -> io::Result<String>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Prompt reading from the process's standard input.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn read_line(&self, message: &str) -> io::Result<String> {
        print!("{} ", message.cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "standard input closed before a line was entered",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
