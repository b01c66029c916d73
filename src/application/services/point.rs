//! Point service
//!
//! Creates a Cloudflare zone for every registrar domain that lacks one and
//! points the domain at the nameservers Cloudflare assigned.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::{ApiResultExt, ApplicationError, ApplicationResult};
use crate::domain::{nameservers_differ, Account, DomainName, RegistrarDomain, Zone};
use crate::infrastructure::traits::{Registrar, ZoneProvider};

/// A domain that could not be fully processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointFailure {
    pub domain: String,
    pub reason: String,
}

/// Outcome of a point run.
#[derive(Debug, Clone, Default)]
pub struct PointReport {
    /// Domains without a zone, in registrar order
    pub planned: Vec<String>,
    /// Zones created in this run
    pub created: Vec<String>,
    /// Domains whose nameservers were pushed to the registrar
    pub nameservers_updated: Vec<String>,
    /// Domains already pointing at the assigned nameservers
    pub nameservers_unchanged: Vec<String>,
    pub failures: Vec<PointFailure>,
}

impl PointReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, domain: &str, reason: impl Into<String>) {
        self.failures.push(PointFailure {
            domain: domain.to_string(),
            reason: reason.into(),
        });
    }
}

/// Service creating missing zones and syncing nameservers.
pub struct PointService {
    registrar: Arc<dyn Registrar>,
    zones: Arc<dyn ZoneProvider>,
    account: Account,
    zone_type: String,
}

impl PointService {
    /// Create a new point service.
    pub fn new(
        registrar: Arc<dyn Registrar>,
        zones: Arc<dyn ZoneProvider>,
        account: Account,
        zone_type: impl Into<String>,
    ) -> Self {
        Self {
            registrar,
            zones,
            account,
            zone_type: zone_type.into(),
        }
    }

    /// Run the workflow.
    ///
    /// Listing and detail lookups are fatal. Failures while creating a zone or
    /// pushing nameservers are recorded per domain and the run continues.
    pub fn run(&self) -> ApplicationResult<PointReport> {
        let to_add = self.plan()?;
        let mut report = PointReport {
            planned: to_add.iter().map(|d| d.name.clone()).collect(),
            ..Default::default()
        };

        if to_add.is_empty() {
            info!("all registrar domains already have a zone");
            return Ok(report);
        }
        info!("zones to create: {}", report.planned.join(", "));

        for domain in &to_add {
            self.point_domain(domain, &mut report);
        }
        Ok(report)
    }

    /// Registrar domains without a zone, with full detail.
    fn plan(&self) -> ApplicationResult<Vec<RegistrarDomain>> {
        let existing: HashSet<String> = self
            .zones
            .list_zones(&self.account, None)
            .with_api_context("list zones")?
            .into_iter()
            .map(|z| z.name)
            .collect();
        debug!("plan: {} existing zones", existing.len());

        let domains = self
            .registrar
            .list_domains()
            .with_api_context("list registrar domains")?;
        debug!("plan: {} registrar domains", domains.len());

        let mut to_add = Vec::new();
        for summary in domains {
            if existing.contains(&summary.name) {
                continue;
            }
            let detail = self
                .registrar
                .get_domain(&summary.name)
                .with_api_context(&format!("get domain info for {}", summary.name))?
                .ok_or_else(|| ApplicationError::DomainNotFound(summary.name.clone()))?;
            to_add.push(detail);
        }
        Ok(to_add)
    }

    fn point_domain(&self, domain: &RegistrarDomain, report: &mut PointReport) {
        let zone = match self
            .zones
            .create_zone(&self.account, &domain.name, &self.zone_type)
        {
            Ok(zone) => zone,
            Err(e) => {
                error!("failed to create zone {}: {}", domain.name, e);
                report.fail(&domain.name, format!("create zone: {}", e));
                return;
            }
        };
        info!(
            "created zone {} ({}), nameservers: {}",
            zone.name,
            zone.id,
            zone.name_servers.join(", ")
        );
        report.created.push(domain.name.clone());

        if !nameservers_differ(&zone.name_servers, &domain.nameservers) {
            debug!("{}: nameservers already match", domain.name);
            report.nameservers_unchanged.push(domain.name.clone());
            return;
        }

        match self.push_nameservers(domain, &zone) {
            Ok(true) => {
                info!("{}: nameservers set to {}", domain.name, zone.name_servers.join(","));
                report.nameservers_updated.push(domain.name.clone());
            }
            Ok(false) => {
                warn!("{}: registrar did not update nameservers", domain.name);
                report.fail(&domain.name, "registrar reported nameservers not updated");
            }
            Err(e) => {
                error!("{}: failed to set nameservers: {}", domain.name, e);
                report.fail(&domain.name, e.to_string());
            }
        }
    }

    fn push_nameservers(&self, domain: &RegistrarDomain, zone: &Zone) -> ApplicationResult<bool> {
        let name = DomainName::parse(&domain.name)?;
        self.registrar
            .set_custom_nameservers(&name, &zone.name_servers.join(","))
            .with_api_context("set custom nameservers")
    }
}
