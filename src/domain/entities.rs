//! Domain entities: core data structures

use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;

/// Minimum number of days since registration before a transfer may start.
/// A domain exactly this old is still rejected.
pub const MIN_DAYS_BEFORE_TRANSFER: f64 = 60.0;

/// Upper bound accepted by the registrar for a transfer renewal.
pub const MAX_TRANSFER_YEARS: u32 = 10;

/// One row of the registrar's domain listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSummary {
    pub name: String,
    pub is_expired: bool,
    pub is_locked: bool,
}

/// WHOIS privacy guard attached to a registrar domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisGuard {
    pub enabled: bool,
    /// Registrar-side guard id, needed to toggle the guard
    pub id: String,
    /// Address that guarded WHOIS mail is forwarded to
    pub forwarded_to: String,
}

/// Full registrar view of a single domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrarDomain {
    pub name: String,
    pub created: DateTime<Utc>,
    pub is_expired: bool,
    pub is_locked: bool,
    pub whois_guard: WhoisGuard,
    /// Nameservers in the order the registrar reports them
    pub nameservers: Vec<String>,
}

impl RegistrarDomain {
    /// Fractional days elapsed between registration and `now`.
    pub fn days_since_creation(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = now.signed_duration_since(self.created);
        elapsed.num_milliseconds() as f64 / (1000.0 * 60.0 * 60.0 * 24.0)
    }

    /// Check the registrar-side transfer preconditions.
    ///
    /// Expiry is checked first: an expired domain is rejected regardless of age.
    pub fn check_transferable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_expired {
            return Err(DomainError::Expired(self.name.clone()));
        }

        let days = self.days_since_creation(now);
        if days <= MIN_DAYS_BEFORE_TRANSFER {
            return Err(DomainError::RegistrationTooRecent {
                name: self.name.clone(),
                days,
            });
        }
        Ok(())
    }
}

/// DNS zone at the zone provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub status: String,
    /// Nameservers assigned by the provider, in provider order
    pub name_servers: Vec<String>,
}

/// Zone-provider account context, resolved once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
}

/// Operator-chosen settings for a registrar transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    pub contact_id: String,
    pub years: u32,
    pub privacy: bool,
    pub auto_renew: bool,
    pub import_dns: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            contact_id: String::new(),
            years: 1,
            privacy: true,
            auto_renew: true,
            import_dns: true,
        }
    }
}

impl TransferOptions {
    /// Validate options before anything is mutated at the registrar.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.contact_id.trim().is_empty() {
            return Err(DomainError::InvalidTransferOptions(
                "a registrant contact id is required (--cloudflare.contact-id)".into(),
            ));
        }
        if !(1..=MAX_TRANSFER_YEARS).contains(&self.years) {
            return Err(DomainError::InvalidTransferOptions(format!(
                "years must be between 1 and {}, got {}",
                MAX_TRANSFER_YEARS, self.years
            )));
        }
        Ok(())
    }
}

/// Registrar-transfer request sent to the zone provider exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub name: String,
    pub auth_code: String,
    pub registrant_contact_id: String,
    pub years: u32,
    pub privacy: bool,
    pub auto_renew: bool,
    pub import_dns: bool,
}

impl TransferRequest {
    pub fn new(name: &str, auth_code: &str, options: &TransferOptions) -> Self {
        Self {
            name: name.to_string(),
            auth_code: auth_code.to_string(),
            registrant_contact_id: options.contact_id.clone(),
            years: options.years,
            privacy: options.privacy,
            auto_renew: options.auto_renew,
            import_dns: options.import_dns,
        }
    }
}

/// Whether the provider-assigned nameservers differ from the registrar's.
///
/// Exact ordered comparison: the same set in a different order counts as a
/// difference.
pub fn nameservers_differ(assigned: &[String], current: &[String]) -> bool {
    assigned != current
}
