//! In-memory fakes of the provider, prompt and clock traits.
//!
//! Every fake records its calls into one shared log so tests can assert the
//! order of registrar and zone-provider calls.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use namecloud::config::Settings;
use namecloud::domain::{
    Account, DomainName, DomainSummary, RegistrarDomain, TransferRequest, WhoisGuard, Zone,
};
use namecloud::infrastructure::di::ServiceContainer;
use namecloud::infrastructure::traits::{Clock, Prompt, Registrar, ZoneProvider};
use namecloud::infrastructure::{ApiError, ApiResult};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Scripted response of a mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Unsuccessful,
    Fail,
}

impl Outcome {
    fn result(self) -> ApiResult<bool> {
        match self {
            Outcome::Success => Ok(true),
            Outcome::Unsuccessful => Ok(false),
            Outcome::Fail => Err(injected()),
        }
    }
}

pub fn injected() -> ApiError {
    ApiError::Provider {
        provider: "Fake",
        code: Some("500".into()),
        message: "injected failure".into(),
    }
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn account() -> Account {
    Account {
        id: "acc-1".into(),
        name: "Test Account".into(),
    }
}

pub fn ns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Registrar domain registered `days_old` days before [`now`].
pub fn domain(name: &str, days_old: i64) -> RegistrarDomain {
    RegistrarDomain {
        name: name.into(),
        created: now() - Duration::days(days_old),
        is_expired: false,
        is_locked: false,
        whois_guard: WhoisGuard::default(),
        nameservers: ns(&["dns1.registrar-servers.com", "dns2.registrar-servers.com"]),
    }
}

/// Locked domain with an enabled WHOIS guard, old enough to transfer.
pub fn guarded_domain(name: &str) -> RegistrarDomain {
    RegistrarDomain {
        is_locked: true,
        whois_guard: WhoisGuard {
            enabled: true,
            id: "WG-1".into(),
            forwarded_to: "owner@example.net".into(),
        },
        ..domain(name, 400)
    }
}

// ============================================================
// Registrar
// ============================================================

pub struct FakeRegistrar {
    log: CallLog,
    pub domains: Vec<RegistrarDomain>,
    pub unlock: Outcome,
    pub relock: Outcome,
    pub guard_disable: Outcome,
    pub guard_enable: Outcome,
    /// Domains whose nameserver update errors
    pub set_ns_fail: HashSet<String>,
    /// Domains whose nameserver update reports Updated=false
    pub set_ns_not_updated: HashSet<String>,
    pub list_fails: bool,
}

impl FakeRegistrar {
    pub fn new(log: &CallLog, domains: Vec<RegistrarDomain>) -> Self {
        Self {
            log: Arc::clone(log),
            domains,
            unlock: Outcome::Success,
            relock: Outcome::Success,
            guard_disable: Outcome::Success,
            guard_enable: Outcome::Success,
            set_ns_fail: HashSet::new(),
            set_ns_not_updated: HashSet::new(),
            list_fails: false,
        }
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(call);
    }
}

impl Registrar for FakeRegistrar {
    fn list_domains(&self) -> ApiResult<Vec<DomainSummary>> {
        self.record("namecheap.list_domains".into());
        if self.list_fails {
            return Err(injected());
        }
        Ok(self
            .domains
            .iter()
            .map(|d| DomainSummary {
                name: d.name.clone(),
                is_expired: d.is_expired,
                is_locked: d.is_locked,
            })
            .collect())
    }

    fn get_domain(&self, name: &str) -> ApiResult<Option<RegistrarDomain>> {
        self.record(format!("namecheap.get_domain {}", name));
        Ok(self.domains.iter().find(|d| d.name == name).cloned())
    }

    fn set_registrar_lock(&self, name: &str, locked: bool) -> ApiResult<bool> {
        if locked {
            self.record(format!("namecheap.lock {}", name));
            self.relock.result()
        } else {
            self.record(format!("namecheap.unlock {}", name));
            self.unlock.result()
        }
    }

    fn enable_whois_guard(&self, guard_id: &str, forward_to: &str) -> ApiResult<bool> {
        self.record(format!("namecheap.whoisguard.enable {} {}", guard_id, forward_to));
        self.guard_enable.result()
    }

    fn disable_whois_guard(&self, guard_id: &str) -> ApiResult<bool> {
        self.record(format!("namecheap.whoisguard.disable {}", guard_id));
        self.guard_disable.result()
    }

    fn set_custom_nameservers(&self, domain: &DomainName, nameservers: &str) -> ApiResult<bool> {
        let name = domain.to_string();
        self.record(format!("namecheap.set_ns {} {}", name, nameservers));
        if self.set_ns_fail.contains(&name) {
            return Err(injected());
        }
        Ok(!self.set_ns_not_updated.contains(&name))
    }
}

// ============================================================
// Zone provider
// ============================================================

pub struct FakeZoneProvider {
    log: CallLog,
    pub zones: Mutex<Vec<Zone>>,
    /// Nameservers assigned to newly created zones
    pub assigned: Vec<String>,
    /// Zone names whose creation errors
    pub create_fail: HashSet<String>,
    pub auth_valid: bool,
    pub transfer: Outcome,
    pub transfers: Mutex<Vec<TransferRequest>>,
}

impl FakeZoneProvider {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Arc::clone(log),
            zones: Mutex::new(Vec::new()),
            assigned: ns(&["ada.ns.cloudflare.com", "bob.ns.cloudflare.com"]),
            create_fail: HashSet::new(),
            auth_valid: true,
            transfer: Outcome::Success,
            transfers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_zone(self, name: &str) -> Self {
        self.zones.lock().unwrap().push(zone(name, &self.assigned));
        self
    }

    pub fn zone_names(&self) -> Vec<String> {
        self.zones
            .lock()
            .unwrap()
            .iter()
            .map(|z| z.name.clone())
            .collect()
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(call);
    }
}

pub fn zone(name: &str, name_servers: &[String]) -> Zone {
    Zone {
        id: format!("zone-{}", name),
        name: name.into(),
        status: "pending".into(),
        name_servers: name_servers.to_vec(),
    }
}

impl ZoneProvider for FakeZoneProvider {
    fn account(&self, account_id: &str) -> ApiResult<Account> {
        self.record(format!("cloudflare.account {}", account_id));
        Ok(account())
    }

    fn list_zones(&self, _account: &Account, name: Option<&str>) -> ApiResult<Vec<Zone>> {
        self.record(format!("cloudflare.list_zones {}", name.unwrap_or("*")));
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .filter(|z| name.map_or(true, |n| z.name == n))
            .cloned()
            .collect())
    }

    fn create_zone(&self, _account: &Account, name: &str, zone_type: &str) -> ApiResult<Zone> {
        self.record(format!("cloudflare.create_zone {} {}", name, zone_type));
        if self.create_fail.contains(name) {
            return Err(injected());
        }
        let created = zone(name, &self.assigned);
        self.zones.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn check_auth_code(&self, _account: &Account, domain: &str, auth_code: &str) -> ApiResult<bool> {
        self.record(format!("cloudflare.check_auth {} {}", domain, auth_code));
        Ok(self.auth_valid)
    }

    fn transfer_domain(&self, zone: &Zone, request: &TransferRequest) -> ApiResult<bool> {
        self.record(format!("cloudflare.transfer {}", zone.name));
        self.transfers.lock().unwrap().push(request.clone());
        self.transfer.result()
    }
}

// ============================================================
// Prompt and clock
// ============================================================

/// Prompt answering with a fixed line, or failing when `None`.
pub struct ScriptedPrompt {
    log: CallLog,
    reply: Option<String>,
}

impl ScriptedPrompt {
    pub fn new(log: &CallLog, reply: Option<&str>) -> Self {
        Self {
            log: Arc::clone(log),
            reply: reply.map(str::to_string),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&self, _message: &str) -> io::Result<String> {
        self.log.lock().unwrap().push("prompt".into());
        self.reply
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn container(
    registrar: Arc<FakeRegistrar>,
    zones: Arc<FakeZoneProvider>,
    prompt: ScriptedPrompt,
) -> ServiceContainer {
    ServiceContainer::with_deps(
        Settings::default(),
        registrar,
        zones,
        account(),
        Arc::new(prompt),
        Arc::new(FixedClock(now())),
    )
}
