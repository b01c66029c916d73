//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{PointService, TransferService};
use crate::config::Settings;
use crate::domain::Account;
use crate::infrastructure::cloudflare::CloudflareClient;
use crate::infrastructure::error::ApiError;
use crate::infrastructure::namecheap::NamecheapClient;
use crate::infrastructure::traits::{
    Clock, Prompt, Registrar, StdinPrompt, SystemClock, ZoneProvider,
};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding the provider clients and the resolved account.
///
/// Built once at startup and read-only afterwards.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Registrar (Namecheap) client
    pub registrar: Arc<dyn Registrar>,

    /// Zone provider (Cloudflare) client
    pub zones: Arc<dyn ZoneProvider>,

    /// Account all zones are created under
    pub account: Account,

    pub prompt: Arc<dyn Prompt>,
    pub clock: Arc<dyn Clock>,
}

impl ServiceContainer {
    /// Create a service container with the real API clients.
    ///
    /// Fails on missing credentials before any request, then resolves the
    /// Cloudflare account.
    pub fn bootstrap(settings: Settings) -> InfraResult<Self> {
        let registrar = NamecheapClient::new(&settings.namecheap)
            .map_err(|e| InfraError::bootstrap("create Namecheap client", e))?;
        let zones = CloudflareClient::new(&settings.cloudflare)
            .map_err(|e| InfraError::bootstrap("create Cloudflare client", e))?;

        let account_id = settings.cloudflare.account_id.trim();
        if account_id.is_empty() {
            return Err(InfraError::bootstrap(
                "resolve Cloudflare account",
                ApiError::InvalidCredentials {
                    provider: "Cloudflare",
                    message: "account id is empty".into(),
                },
            ));
        }
        let account = zones
            .account(account_id)
            .map_err(|e| InfraError::bootstrap("resolve Cloudflare account", e))?;
        debug!("bootstrap: account {} ({})", account.name, account.id);

        Ok(Self::with_deps(
            settings,
            Arc::new(registrar),
            Arc::new(zones),
            account,
            Arc::new(StdinPrompt),
            Arc::new(SystemClock),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        registrar: Arc<dyn Registrar>,
        zones: Arc<dyn ZoneProvider>,
        account: Account,
        prompt: Arc<dyn Prompt>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            registrar,
            zones,
            account,
            prompt,
            clock,
        }
    }

    pub fn point_service(&self) -> PointService {
        PointService::new(
            Arc::clone(&self.registrar),
            Arc::clone(&self.zones),
            self.account.clone(),
            self.settings.cloudflare.zone_type.clone(),
        )
    }

    pub fn transfer_service(&self) -> TransferService {
        TransferService::new(
            Arc::clone(&self.registrar),
            Arc::clone(&self.zones),
            self.account.clone(),
            Arc::clone(&self.prompt),
            Arc::clone(&self.clock),
        )
    }
}
