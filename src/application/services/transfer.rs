//! Transfer service
//!
//! Moves a domain from Namecheap to Cloudflare Registrar.
//!
//! ```text
//! validate -> fetch detail -> eligibility -> zone -> auth code -> check code
//!   (read-only: failures abort, nothing changed)
//! unlock -> disable guard -> initiate transfer
//!   (mutating: failures run the bailout)
//! bailout: relock -> re-enable guard -> RolledBack
//!   (relock failure: LeftUnlocked, guard failure: WhoisUnprotected)
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::{ApiResultExt, ApplicationError, ApplicationResult};
use crate::domain::{Account, RegistrarDomain, TransferOptions, TransferRequest, Zone};
use crate::infrastructure::traits::{Clock, Prompt, Registrar, ZoneProvider};

/// Service running the gated registrar transfer.
pub struct TransferService {
    registrar: Arc<dyn Registrar>,
    zones: Arc<dyn ZoneProvider>,
    account: Account,
    prompt: Arc<dyn Prompt>,
    clock: Arc<dyn Clock>,
}

impl TransferService {
    /// Create a new transfer service.
    pub fn new(
        registrar: Arc<dyn Registrar>,
        zones: Arc<dyn ZoneProvider>,
        account: Account,
        prompt: Arc<dyn Prompt>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registrar,
            zones,
            account,
            prompt,
            clock,
        }
    }

    /// Transfer `domain` using `options`.
    ///
    /// Every check runs before the registrar is touched. Once the domain has
    /// been unlocked, a failure restores lock and WHOIS guard before returning.
    pub fn run(&self, domain: &str, options: &TransferOptions) -> ApplicationResult<()> {
        let name = domain.trim();
        if name.is_empty() {
            return Err(ApplicationError::MissingDomain);
        }
        options.validate()?;

        let detail = self
            .registrar
            .get_domain(name)
            .with_api_context(&format!("get domain info for {}", name))?
            .ok_or_else(|| ApplicationError::DomainNotFound(name.to_string()))?;
        detail.check_transferable(self.clock.now())?;
        debug!(
            "run: {} eligible, locked={}, guard={}",
            name, detail.is_locked, detail.whois_guard.enabled
        );

        let zone = self.find_zone(name)?;
        let auth_code = self.read_auth_code(name)?;

        let valid = self
            .zones
            .check_auth_code(&self.account, name, &auth_code)
            .with_api_context("check auth code")?;
        if !valid {
            return Err(ApplicationError::InvalidAuthCode {
                domain: name.to_string(),
            });
        }

        let request = TransferRequest::new(name, &auth_code, options);
        if let Err(cause) = self.release_and_transfer(&detail, &zone, &request) {
            return Err(self.bail_out(&detail, cause));
        }

        info!(
            "transfer of {} initiated; confirm it from the email Cloudflare Registrar sends",
            name
        );
        Ok(())
    }

    fn find_zone(&self, name: &str) -> ApplicationResult<Zone> {
        self.zones
            .list_zones(&self.account, Some(name))
            .with_api_context(&format!("list zones for {}", name))?
            .into_iter()
            .find(|z| z.name == name)
            .ok_or_else(|| ApplicationError::ZoneNotFound(name.to_string()))
    }

    fn read_auth_code(&self, name: &str) -> ApplicationResult<String> {
        let line = self
            .prompt
            .read_line(&format!("Auth code for {}:", name))
            .map_err(ApplicationError::AuthCodeInput)?;
        let code = line.trim();
        if code.is_empty() {
            return Err(ApplicationError::BlankAuthCode);
        }
        Ok(code.to_string())
    }

    /// Mutating steps. The first failure is returned without further calls.
    fn release_and_transfer(
        &self,
        detail: &RegistrarDomain,
        zone: &Zone,
        request: &TransferRequest,
    ) -> ApplicationResult<()> {
        let name = detail.name.as_str();

        if detail.is_locked {
            info!("unlocking {}", name);
            let unlocked = self
                .registrar
                .set_registrar_lock(name, false)
                .with_api_context("unlock domain")?;
            ensure(unlocked, "unlock", name)?;
        }

        if detail.whois_guard.enabled {
            info!("disabling WHOIS guard for {}", name);
            let disabled = self
                .registrar
                .disable_whois_guard(&detail.whois_guard.id)
                .with_api_context("disable WHOIS guard")?;
            ensure(disabled, "WHOIS guard disable", name)?;
        }

        info!("initiating transfer of {}", name);
        let started = self
            .zones
            .transfer_domain(zone, request)
            .with_api_context("initiate transfer")?;
        ensure(started, "transfer", name)
    }

    /// Best-effort restore of the registrar state.
    ///
    /// Relock always runs. The guard is re-enabled only if it was enabled
    /// before, and only after a successful relock.
    fn bail_out(&self, detail: &RegistrarDomain, cause: ApplicationError) -> ApplicationError {
        let name = detail.name.clone();
        error!("transfer of {} failed: {}", name, cause);
        warn!("bailing out, restoring registrar state of {}", name);

        let relock = match self.registrar.set_registrar_lock(&name, true) {
            Ok(true) => None,
            Ok(false) => Some("registrar reported relock unsuccessful".to_string()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = relock {
            warn!("{} is left UNLOCKED: {}", name, reason);
            return ApplicationError::LeftUnlocked {
                domain: name,
                reason,
            };
        }

        if detail.whois_guard.enabled {
            let guard = &detail.whois_guard;
            let restore = match self
                .registrar
                .enable_whois_guard(&guard.id, &guard.forwarded_to)
            {
                Ok(true) => None,
                Ok(false) => Some("registrar reported WHOIS guard enable unsuccessful".to_string()),
                Err(e) => Some(e.to_string()),
            };
            if let Some(reason) = restore {
                warn!("WHOIS information of {} is left UNPROTECTED: {}", name, reason);
                return ApplicationError::WhoisUnprotected {
                    domain: name,
                    reason,
                };
            }
        }

        info!("registrar state of {} restored", name);
        ApplicationError::RolledBack {
            domain: name,
            cause: Box::new(cause),
        }
    }
}

fn ensure(success: bool, action: &'static str, domain: &str) -> ApplicationResult<()> {
    if success {
        Ok(())
    } else {
        Err(ApplicationError::Unsuccessful {
            action,
            domain: domain.to_string(),
        })
    }
}
