//! Namecheap registrar client
//!
//! Namecheap exposes a single XML endpoint; the operation is selected with the
//! `Command` query parameter and every request carries the API credentials and
//! a whitelisted client IP.
//!
//! Response shape:
//! ```text
//! <ApiResponse Status="OK|ERROR">
//!   <Errors><Error Number="2019166">Domain not found</Error></Errors>
//!   <CommandResponse Type="namecheap.domains.getInfo"> ... </CommandResponse>
//! </ApiResponse>
//! ```

use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::NamecheapSettings;
use crate::domain::{DomainName, DomainSummary, RegistrarDomain, WhoisGuard};
use crate::infrastructure::error::{ApiError, ApiResult};
use crate::infrastructure::traits::Registrar;

const PROVIDER: &str = "Namecheap";
pub const NAMECHEAP_API_URL: &str = "https://api.namecheap.com/xml.response";
pub const NAMECHEAP_SANDBOX_URL: &str = "https://api.sandbox.namecheap.com/xml.response";
const PUBLIC_IP_URL: &str = "https://api.ipify.org";
const PAGE_SIZE: u32 = 100;

/// Error numbers Namecheap uses when a domain is unknown to the account.
const DOMAIN_NOT_FOUND_CODES: [&str; 2] = ["2019166", "2016166"];

// ============================================================
// XML response model
// ============================================================

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "@Status", default)]
    status: String,
    #[serde(rename = "Errors", default)]
    errors: ErrorList,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorList {
    #[serde(rename = "Error", default)]
    items: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(rename = "@Number", default)]
    number: Option<String>,
    #[serde(rename = "$text", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "CommandResponse")]
    command_response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct DomainListResponse {
    #[serde(rename = "DomainGetListResult", default)]
    result: DomainListResult,
    #[serde(rename = "Paging")]
    paging: Option<Paging>,
}

#[derive(Debug, Default, Deserialize)]
struct DomainListResult {
    #[serde(rename = "Domain", default)]
    domains: Vec<DomainListEntry>,
}

#[derive(Debug, Deserialize)]
struct DomainListEntry {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@IsExpired", default)]
    is_expired: String,
    #[serde(rename = "@IsLocked", default)]
    is_locked: String,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(rename = "TotalItems", default)]
    total_items: u32,
}

#[derive(Debug, Deserialize)]
struct DomainInfoResponse {
    #[serde(rename = "DomainGetInfoResult")]
    result: DomainInfoResult,
}

#[derive(Debug, Deserialize)]
struct DomainInfoResult {
    #[serde(rename = "@Status", default)]
    status: String,
    #[serde(rename = "@DomainName")]
    domain_name: String,
    #[serde(rename = "@IsExpired", default)]
    is_expired: String,
    #[serde(rename = "DomainDetails")]
    details: DomainDetails,
    #[serde(rename = "Whoisguard")]
    whoisguard: Option<WhoisguardXml>,
    #[serde(rename = "DnsDetails")]
    dns: Option<DnsDetails>,
}

#[derive(Debug, Deserialize)]
struct DomainDetails {
    #[serde(rename = "CreatedDate")]
    created: String,
}

#[derive(Debug, Deserialize)]
struct WhoisguardXml {
    #[serde(rename = "@Enabled", default)]
    enabled: String,
    #[serde(rename = "ID", default)]
    id: Option<String>,
    #[serde(rename = "EmailDetails")]
    email: Option<EmailDetails>,
}

#[derive(Debug, Deserialize)]
struct EmailDetails {
    #[serde(rename = "@ForwardedTo", default)]
    forwarded_to: String,
}

#[derive(Debug, Default, Deserialize)]
struct DnsDetails {
    #[serde(rename = "Nameserver", default)]
    nameservers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LockStatusResponse {
    #[serde(rename = "DomainGetRegistrarLockResult")]
    result: LockStatusResult,
}

#[derive(Debug, Deserialize)]
struct LockStatusResult {
    #[serde(rename = "@RegistrarLockStatus", default)]
    locked: String,
}

/// Commands answering with a single `IsSuccess` flag.
#[derive(Debug, Deserialize)]
struct SuccessResponse {
    #[serde(
        rename = "DomainSetRegistrarLockResult",
        alias = "WhoisguardEnableResult",
        alias = "WhoisguardDisableResult"
    )]
    result: SuccessResult,
}

#[derive(Debug, Deserialize)]
struct SuccessResult {
    #[serde(rename = "@IsSuccess", default)]
    is_success: String,
}

#[derive(Debug, Deserialize)]
struct SetCustomResponse {
    #[serde(rename = "DomainDNSSetCustomResult")]
    result: SetCustomResult,
}

#[derive(Debug, Deserialize)]
struct SetCustomResult {
    #[serde(rename = "@Updated", default)]
    updated: String,
}

/// Namecheap spells booleans as `true`, `True` or `TRUE`.
fn flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Parse Namecheap's `MM/DD/YYYY` dates as midnight UTC.
fn parse_date(value: &str) -> ApiResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y").map_err(|e| {
        ApiError::decode(PROVIDER, format!("invalid date {:?}: {}", value, e))
    })?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::decode(PROVIDER, format!("invalid date {:?}", value)))
}

// ============================================================
// Client
// ============================================================

/// Namecheap registrar client.
pub struct NamecheapClient {
    client: Client,
    settings: NamecheapSettings,
    base_url: String,
    client_ip: OnceLock<String>,
}

impl NamecheapClient {
    /// Create a client for the production or sandbox endpoint.
    pub fn new(settings: &NamecheapSettings) -> ApiResult<Self> {
        let base_url = settings.base_url.clone().unwrap_or_else(|| {
            if settings.sandbox {
                NAMECHEAP_SANDBOX_URL.to_string()
            } else {
                NAMECHEAP_API_URL.to_string()
            }
        });
        Self::with_base_url(settings, &base_url)
    }

    /// Create a client against an explicit endpoint.
    pub fn with_base_url(settings: &NamecheapSettings, base_url: &str) -> ApiResult<Self> {
        if settings.api_user.trim().is_empty() || settings.api_token.trim().is_empty() {
            return Err(ApiError::InvalidCredentials {
                provider: PROVIDER,
                message: "API user and API token must not be empty".into(),
            });
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let client_ip = OnceLock::new();
        if let Some(ip) = settings.client_ip.as_deref().filter(|ip| !ip.is_empty()) {
            let _ = client_ip.set(ip.to_string());
        }

        Ok(Self {
            client,
            settings: settings.clone(),
            base_url: base_url.to_string(),
            client_ip,
        })
    }

    fn username(&self) -> &str {
        if self.settings.username.is_empty() {
            &self.settings.api_user
        } else {
            &self.settings.username
        }
    }

    /// Client IP sent with every request; looked up once if not configured.
    fn client_ip(&self) -> ApiResult<&str> {
        if let Some(ip) = self.client_ip.get() {
            return Ok(ip.as_str());
        }

        debug!("Looking up public IP for Namecheap ClientIp");
        let ip = self
            .client
            .get(PUBLIC_IP_URL)
            .send()?
            .error_for_status()?
            .text()?
            .trim()
            .to_string();
        Ok(self.client_ip.get_or_init(|| ip).as_str())
    }

    /// Run one API command and decode its `CommandResponse`.
    fn call<T: DeserializeOwned>(&self, command: &str, params: &[(&str, &str)]) -> ApiResult<T> {
        let client_ip = self.client_ip()?.to_string();

        let mut query: Vec<(&str, &str)> = vec![
            ("ApiUser", self.settings.api_user.as_str()),
            ("ApiKey", self.settings.api_token.as_str()),
            ("UserName", self.username()),
            ("ClientIp", client_ip.as_str()),
            ("Command", command),
        ];
        query.extend_from_slice(params);

        debug!("Namecheap API request: {} with params: {:?}", command, params);

        let response = self.client.get(&self.base_url).query(&query).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ApiError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        Self::decode(&body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
        let errors: ErrorEnvelope = quick_xml::de::from_str(body)
            .map_err(|e| ApiError::decode(PROVIDER, e.to_string()))?;

        if errors.status.eq_ignore_ascii_case("ERROR") || !errors.errors.items.is_empty() {
            let code = errors.errors.items.first().and_then(|e| e.number.clone());
            let message = if errors.errors.items.is_empty() {
                "request failed without error details".to_string()
            } else {
                errors
                    .errors
                    .items
                    .iter()
                    .map(|e| e.message.trim())
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            return Err(ApiError::Provider {
                provider: PROVIDER,
                code,
                message,
            });
        }

        let envelope: Envelope<T> = quick_xml::de::from_str(body)
            .map_err(|e| ApiError::decode(PROVIDER, e.to_string()))?;
        envelope
            .command_response
            .ok_or_else(|| ApiError::decode(PROVIDER, "missing CommandResponse"))
    }

    fn registrar_lock(&self, name: &str) -> ApiResult<bool> {
        let response: LockStatusResponse =
            self.call("namecheap.domains.getRegistrarLock", &[("DomainName", name)])?;
        Ok(flag(&response.result.locked))
    }
}

impl Registrar for NamecheapClient {
    fn list_domains(&self) -> ApiResult<Vec<DomainSummary>> {
        let page_size = PAGE_SIZE.to_string();
        let mut domains = Vec::new();
        let mut page = 1u32;

        loop {
            let page_str = page.to_string();
            let response: DomainListResponse = self.call(
                "namecheap.domains.getList",
                &[("PageSize", page_size.as_str()), ("Page", page_str.as_str())],
            )?;

            let fetched = response.result.domains.len();
            domains.extend(response.result.domains.into_iter().map(|d| DomainSummary {
                is_expired: flag(&d.is_expired),
                is_locked: flag(&d.is_locked),
                name: d.name,
            }));

            let total = response
                .paging
                .map(|p| p.total_items as usize)
                .unwrap_or(domains.len());
            if fetched == 0 || domains.len() >= total {
                break;
            }
            page += 1;
        }

        debug!("Namecheap lists {} domains", domains.len());
        Ok(domains)
    }

    fn get_domain(&self, name: &str) -> ApiResult<Option<RegistrarDomain>> {
        let info: DomainInfoResponse =
            match self.call("namecheap.domains.getInfo", &[("DomainName", name)]) {
                Ok(info) => info,
                Err(e) if e.code().is_some_and(|c| DOMAIN_NOT_FOUND_CODES.contains(&c)) => {
                    debug!("Namecheap does not know domain {}: {}", name, e);
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
        let info = info.result;

        let whois_guard = info
            .whoisguard
            .map(|guard| WhoisGuard {
                enabled: flag(&guard.enabled),
                id: guard.id.unwrap_or_default().trim().to_string(),
                forwarded_to: guard.email.map(|e| e.forwarded_to).unwrap_or_default(),
            })
            .unwrap_or_default();

        let is_locked = self.registrar_lock(&info.domain_name)?;

        Ok(Some(RegistrarDomain {
            created: parse_date(&info.details.created)?,
            is_expired: flag(&info.is_expired) || info.status.eq_ignore_ascii_case("expired"),
            is_locked,
            whois_guard,
            nameservers: info
                .dns
                .unwrap_or_default()
                .nameservers
                .into_iter()
                .map(|ns| ns.trim().to_string())
                .collect(),
            name: info.domain_name,
        }))
    }

    fn set_registrar_lock(&self, name: &str, locked: bool) -> ApiResult<bool> {
        let action = if locked { "LOCK" } else { "UNLOCK" };
        let response: SuccessResponse = self.call(
            "namecheap.domains.setRegistrarLock",
            &[("DomainName", name), ("LockAction", action)],
        )?;
        Ok(flag(&response.result.is_success))
    }

    fn enable_whois_guard(&self, guard_id: &str, forward_to: &str) -> ApiResult<bool> {
        let response: SuccessResponse = self.call(
            "namecheap.whoisguard.enable",
            &[("WhoisguardID", guard_id), ("ForwardedToEmail", forward_to)],
        )?;
        Ok(flag(&response.result.is_success))
    }

    fn disable_whois_guard(&self, guard_id: &str) -> ApiResult<bool> {
        let response: SuccessResponse =
            self.call("namecheap.whoisguard.disable", &[("WhoisguardID", guard_id)])?;
        Ok(flag(&response.result.is_success))
    }

    fn set_custom_nameservers(&self, domain: &DomainName, nameservers: &str) -> ApiResult<bool> {
        let response: SetCustomResponse = self.call(
            "namecheap.domains.dns.setCustom",
            &[
                ("SLD", domain.sld.as_str()),
                ("TLD", domain.tld.as_str()),
                ("Nameservers", nameservers),
            ],
        )?;
        Ok(flag(&response.result.updated))
    }
}
