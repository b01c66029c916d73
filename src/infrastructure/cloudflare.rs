//! Cloudflare zone and registrar client
//!
//! Talks to the v4 REST API with global API key authentication
//! (`X-Auth-Email` / `X-Auth-Key`). Every response uses the same envelope:
//! `{"success": bool, "errors": [...], "result": ..., "result_info": {...}}`.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CloudflareSettings;
use crate::domain::{Account, TransferRequest, Zone};
use crate::infrastructure::error::{ApiError, ApiResult};
use crate::infrastructure::traits::ZoneProvider;

const PROVIDER: &str = "Cloudflare";
pub const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";
const ZONES_PER_PAGE: u32 = 50;

// ============================================================
// JSON model
// ============================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ResponseMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawZone {
    id: String,
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    name_servers: Vec<String>,
}

impl From<RawZone> for Zone {
    fn from(z: RawZone) -> Self {
        Zone {
            id: z.id,
            name: z.name,
            status: z.status,
            name_servers: z.name_servers,
        }
    }
}

#[derive(Debug, Serialize)]
struct AccountRef<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateZoneBody<'a> {
    name: &'a str,
    account: AccountRef<'a>,
    jump_start: bool,
    #[serde(rename = "type")]
    zone_type: &'a str,
}

#[derive(Debug, Serialize)]
struct CheckAuthBody<'a> {
    auth_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckAuthResult {
    #[serde(default)]
    valid: bool,
}

#[derive(Debug, Serialize)]
struct TransferBody<'a> {
    name: &'a str,
    auth_code: &'a str,
    registrant_contact_id: &'a str,
    years: u32,
    privacy: bool,
    auto_renew: bool,
    import_dns: bool,
}

impl<'a> From<&'a TransferRequest> for TransferBody<'a> {
    fn from(r: &'a TransferRequest) -> Self {
        Self {
            name: &r.name,
            auth_code: &r.auth_code,
            registrant_contact_id: &r.registrant_contact_id,
            years: r.years,
            privacy: r.privacy,
            auto_renew: r.auto_renew,
            import_dns: r.import_dns,
        }
    }
}

impl<T> Envelope<T> {
    fn provider_error(&self) -> Option<ApiError> {
        if self.errors.is_empty() {
            return None;
        }
        Some(ApiError::Provider {
            provider: PROVIDER,
            code: self.errors.first().and_then(|e| e.code).map(|c| c.to_string()),
            message: self
                .errors
                .iter()
                .map(|e| match e.code {
                    Some(code) => format!("{} ({})", e.message, code),
                    None => e.message.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        })
    }

    fn into_result(self) -> ApiResult<T> {
        if !self.success {
            return Err(self.provider_error().unwrap_or_else(|| ApiError::Provider {
                provider: PROVIDER,
                code: None,
                message: "request was not successful".into(),
            }));
        }
        self.result
            .ok_or_else(|| ApiError::decode(PROVIDER, "missing result"))
    }
}

// ============================================================
// Client
// ============================================================

/// Cloudflare API client.
pub struct CloudflareClient {
    client: Client,
    settings: CloudflareSettings,
    base_url: String,
}

impl CloudflareClient {
    pub fn new(settings: &CloudflareSettings) -> ApiResult<Self> {
        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| CLOUDFLARE_API_URL.to_string());
        Self::with_base_url(settings, &base_url)
    }

    pub fn with_base_url(settings: &CloudflareSettings, base_url: &str) -> ApiResult<Self> {
        if settings.api_key.trim().is_empty() || settings.email.trim().is_empty() {
            return Err(ApiError::InvalidCredentials {
                provider: PROVIDER,
                message: "API key and email must not be empty".into(),
            });
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            settings: settings.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Auth-Email", &self.settings.email)
            .header("X-Auth-Key", &self.settings.api_key)
    }

    /// Send a request and decode the response envelope.
    ///
    /// Provider-reported errors become `ApiError::Provider` even on non-2xx
    /// statuses, since Cloudflare sends the envelope with its error codes.
    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<Envelope<T>> {
        let response = self.authed(request).send()?;
        let status = response.status();
        let body = response.text()?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Status {
                    provider: PROVIDER,
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => return Err(ApiError::decode(PROVIDER, e.to_string())),
        };

        if let Some(err) = envelope.provider_error() {
            return Err(err);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }
        Ok(envelope)
    }
}

impl ZoneProvider for CloudflareClient {
    fn account(&self, account_id: &str) -> ApiResult<Account> {
        debug!("Resolving Cloudflare account {}", account_id);
        let account: RawAccount = self
            .send(self.client.get(self.url(&format!("/accounts/{}", account_id))))?
            .into_result()?;
        Ok(Account {
            id: account.id,
            name: account.name,
        })
    }

    fn list_zones(&self, account: &Account, name: Option<&str>) -> ApiResult<Vec<Zone>> {
        let per_page = ZONES_PER_PAGE.to_string();
        let mut zones = Vec::new();
        let mut page = 1u32;

        loop {
            let page_str = page.to_string();
            let mut query = vec![
                ("account.id", account.id.as_str()),
                ("per_page", per_page.as_str()),
                ("page", page_str.as_str()),
            ];
            if let Some(name) = name {
                query.push(("name", name));
            }

            let envelope: Envelope<Vec<RawZone>> =
                self.send(self.client.get(self.url("/zones")).query(&query))?;
            let info = envelope.result_info.as_ref().map(|i| (i.page, i.total_pages));
            let batch = envelope.into_result()?;
            let fetched = batch.len();
            zones.extend(batch.into_iter().map(Zone::from));

            match info {
                Some((current, total)) if fetched > 0 && current.max(page) < total => page += 1,
                _ => break,
            }
        }

        debug!("Cloudflare lists {} zones", zones.len());
        Ok(zones)
    }

    fn create_zone(&self, account: &Account, name: &str, zone_type: &str) -> ApiResult<Zone> {
        let body = CreateZoneBody {
            name,
            account: AccountRef { id: &account.id },
            jump_start: true,
            zone_type,
        };
        let zone: RawZone = self
            .send(self.client.post(self.url("/zones")).json(&body))?
            .into_result()?;
        Ok(zone.into())
    }

    fn check_auth_code(
        &self,
        account: &Account,
        domain: &str,
        auth_code: &str,
    ) -> ApiResult<bool> {
        let path = format!(
            "/accounts/{}/registrar/domains/{}/check_auth",
            account.id, domain
        );
        let check: CheckAuthResult = self
            .send(
                self.client
                    .post(self.url(&path))
                    .json(&CheckAuthBody { auth_code }),
            )?
            .into_result()?;
        Ok(check.valid)
    }

    fn transfer_domain(&self, zone: &Zone, request: &TransferRequest) -> ApiResult<bool> {
        let path = format!("/zones/{}/registrar/domains/transfer", zone.id);
        let body = [TransferBody::from(request)];
        let envelope: Envelope<serde_json::Value> =
            self.send(self.client.post(self.url(&path)).json(&body))?;
        Ok(envelope.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn test_settings() -> CloudflareSettings {
        CloudflareSettings {
            api_key: "cf-key".into(),
            email: "ops@example.com".into(),
            account_id: "acc-1".into(),
            ..Default::default()
        }
    }

    fn account() -> Account {
        Account {
            id: "acc-1".into(),
            name: "Ops".into(),
        }
    }

    #[test]
    fn test_new_rejects_empty_credentials() {
        let settings = CloudflareSettings {
            email: String::new(),
            ..test_settings()
        };
        assert!(matches!(
            CloudflareClient::new(&settings),
            Err(ApiError::InvalidCredentials { .. })
        ));
    }

    #[test]
    fn test_account_sends_auth_headers() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/accounts/acc-1")
            .match_header("x-auth-email", "ops@example.com")
            .match_header("x-auth-key", "cf-key")
            .with_body(
                json!({"success": true, "errors": [], "result": {"id": "acc-1", "name": "Ops"}})
                    .to_string(),
            )
            .create();

        let client = CloudflareClient::with_base_url(&test_settings(), &server.url()).unwrap();
        let resolved = client.account("acc-1").unwrap();

        mock.assert();
        assert_eq!(resolved, account());
    }

    #[test]
    fn test_list_zones_fetches_every_page() {
        let mut server = Server::new();
        let page1 = server
            .mock("GET", "/zones")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("account.id".into(), "acc-1".into()),
                Matcher::UrlEncoded("per_page".into(), "50".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_body(
                json!({
                    "success": true, "errors": [],
                    "result": [{"id": "z1", "name": "example.com", "status": "active",
                                "name_servers": ["ada.ns.cloudflare.com", "bob.ns.cloudflare.com"]}],
                    "result_info": {"page": 1, "per_page": 50, "total_pages": 2, "count": 1, "total_count": 2}
                })
                .to_string(),
            )
            .create();
        let page2 = server
            .mock("GET", "/zones")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(
                json!({
                    "success": true, "errors": [],
                    "result": [{"id": "z2", "name": "test.org", "status": "pending", "name_servers": []}],
                    "result_info": {"page": 2, "per_page": 50, "total_pages": 2, "count": 1, "total_count": 2}
                })
                .to_string(),
            )
            .create();

        let client = CloudflareClient::with_base_url(&test_settings(), &server.url()).unwrap();
        let zones = client.list_zones(&account(), None).unwrap();

        page1.assert();
        page2.assert();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name_servers.len(), 2);
        assert_eq!(zones[1].name, "test.org");
    }

    #[test]
    fn test_create_zone_posts_account_and_type() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/zones")
            .match_body(Matcher::PartialJson(json!({
                "name": "example.com",
                "account": {"id": "acc-1"},
                "jump_start": true,
                "type": "full"
            })))
            .with_body(
                json!({"success": true, "errors": [], "result": {
                    "id": "z1", "name": "example.com", "status": "pending",
                    "name_servers": ["ada.ns.cloudflare.com", "bob.ns.cloudflare.com"]}})
                .to_string(),
            )
            .create();

        let client = CloudflareClient::with_base_url(&test_settings(), &server.url()).unwrap();
        let zone = client.create_zone(&account(), "example.com", "full").unwrap();

        mock.assert();
        assert_eq!(zone.id, "z1");
        assert_eq!(zone.name_servers[0], "ada.ns.cloudflare.com");
    }

    #[test]
    fn test_provider_errors_carry_code() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/zones")
            .with_status(400)
            .with_body(
                json!({"success": false, "errors": [{"code": 1061, "message": "example.com already exists"}],
                       "result": null})
                .to_string(),
            )
            .create();

        let client = CloudflareClient::with_base_url(&test_settings(), &server.url()).unwrap();
        let err = client.create_zone(&account(), "example.com", "full").unwrap_err();

        assert_eq!(err.code(), Some("1061"));
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_check_auth_code_reads_validity() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/accounts/acc-1/registrar/domains/example.com/check_auth")
            .match_body(Matcher::Json(json!({"auth_code": "EPP-123"})))
            .with_body(json!({"success": true, "errors": [], "result": {"valid": false}}).to_string())
            .create();

        let client = CloudflareClient::with_base_url(&test_settings(), &server.url()).unwrap();
        assert!(!client
            .check_auth_code(&account(), "example.com", "EPP-123")
            .unwrap());
    }

    #[test]
    fn test_transfer_domain_sends_request_array() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/zones/z1/registrar/domains/transfer")
            .match_body(Matcher::Json(json!([{
                "name": "example.com",
                "auth_code": "EPP-123",
                "registrant_contact_id": "contact-9",
                "years": 1,
                "privacy": true,
                "auto_renew": false,
                "import_dns": true
            }])))
            .with_body(json!({"success": true, "errors": [], "result": [{"name": "example.com"}]}).to_string())
            .create();

        let client = CloudflareClient::with_base_url(&test_settings(), &server.url()).unwrap();
        let zone = Zone {
            id: "z1".into(),
            name: "example.com".into(),
            status: "active".into(),
            name_servers: vec![],
        };
        let request = TransferRequest {
            name: "example.com".into(),
            auth_code: "EPP-123".into(),
            registrant_contact_id: "contact-9".into(),
            years: 1,
            privacy: true,
            auto_renew: false,
            import_dns: true,
        };

        assert!(client.transfer_domain(&zone, &request).unwrap());
        mock.assert();
    }

    #[test]
    fn test_undecodable_error_body_reports_status() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/accounts/acc-1")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create();

        let client = CloudflareClient::with_base_url(&test_settings(), &server.url()).unwrap();
        assert!(matches!(
            client.account("acc-1"),
            Err(ApiError::Status { status: 502, .. })
        ));
    }
}
