//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <path>`, otherwise `$XDG_CONFIG_HOME/namecloud/namecloud.toml`
//! 3. Environment variables: `NAMECLOUD_<SECTION>__<KEY>`, e.g. `NAMECLOUD_CLOUDFLARE__API_KEY`
//! 4. Command line flags (see [`SettingsOverrides`])

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::TransferOptions;

const MASK: &str = "********";

/// Namecheap API credentials and endpoint selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NamecheapSettings {
    pub api_user: String,
    pub api_token: String,
    /// Account username (defaults to `api_user` when empty)
    pub username: String,
    /// Whitelisted client IP; looked up once when not set
    pub client_ip: Option<String>,
    /// Use the sandbox endpoint
    pub sandbox: bool,
    /// Explicit endpoint override
    pub base_url: Option<String>,
}

/// Cloudflare API credentials and zone creation defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloudflareSettings {
    pub api_key: String,
    pub email: String,
    pub account_id: String,
    /// Plan type for newly created zones
    pub zone_type: String,
    /// Explicit endpoint override
    pub base_url: Option<String>,
}

impl Default for CloudflareSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            email: String::new(),
            account_id: String::new(),
            zone_type: "full".into(),
            base_url: None,
        }
    }
}

/// Defaults for `transfer` flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransferSettings {
    pub contact_id: String,
    pub years: u32,
    pub privacy: bool,
    pub auto_renew: bool,
    pub import_dns: bool,
}

impl Default for TransferSettings {
    fn default() -> Self {
        let defaults = TransferOptions::default();
        Self {
            contact_id: defaults.contact_id,
            years: defaults.years,
            privacy: defaults.privacy,
            auto_renew: defaults.auto_renew,
            import_dns: defaults.import_dns,
        }
    }
}

impl From<&TransferSettings> for TransferOptions {
    fn from(t: &TransferSettings) -> Self {
        TransferOptions {
            contact_id: t.contact_id.clone(),
            years: t.years,
            privacy: t.privacy,
            auto_renew: t.auto_renew,
            import_dns: t.import_dns,
        }
    }
}

/// Unified configuration for namecloud.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub namecheap: NamecheapSettings,
    pub cloudflare: CloudflareSettings,
    pub transfer: TransferSettings,
}

/// Values given on the command line; `None` keeps the loaded value.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub namecheap_api_user: Option<String>,
    pub namecheap_api_token: Option<String>,
    pub namecheap_username: Option<String>,
    pub namecheap_client_ip: Option<String>,
    pub namecheap_sandbox: Option<bool>,
    pub cloudflare_api_key: Option<String>,
    pub cloudflare_email: Option<String>,
    pub cloudflare_account_id: Option<String>,
    pub contact_id: Option<String>,
    pub years: Option<u32>,
    pub privacy: Option<bool>,
    pub auto_renew: Option<bool>,
    pub import_dns: Option<bool>,
}

/// Get the XDG config directory for namecloud.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "namecloud").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("namecloud.toml"))
}

/// Resolve the config file in use: the explicit path, else the global one.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(global_config_path)
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// An explicitly given config file must exist; the global one is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = Config::builder();

        if let Some(path) = config_path(explicit) {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(explicit.is_some()),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("NAMECLOUD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)
    }

    /// Apply command line values on top of the loaded settings.
    pub fn with_overrides(mut self, o: SettingsOverrides) -> Self {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *target = v;
            }
        }

        set(&mut self.namecheap.api_user, o.namecheap_api_user);
        set(&mut self.namecheap.api_token, o.namecheap_api_token);
        set(&mut self.namecheap.username, o.namecheap_username);
        if o.namecheap_client_ip.is_some() {
            self.namecheap.client_ip = o.namecheap_client_ip;
        }
        set(&mut self.namecheap.sandbox, o.namecheap_sandbox);
        set(&mut self.cloudflare.api_key, o.cloudflare_api_key);
        set(&mut self.cloudflare.email, o.cloudflare_email);
        set(&mut self.cloudflare.account_id, o.cloudflare_account_id);
        set(&mut self.transfer.contact_id, o.contact_id);
        set(&mut self.transfer.years, o.years);
        set(&mut self.transfer.privacy, o.privacy);
        set(&mut self.transfer.auto_renew, o.auto_renew);
        set(&mut self.transfer.import_dns, o.import_dns);
        self
    }

    /// Copy with credentials replaced, safe to print.
    pub fn masked(&self) -> Self {
        fn mask(value: &str) -> String {
            if value.is_empty() {
                String::new()
            } else {
                MASK.to_string()
            }
        }

        let mut masked = self.clone();
        masked.namecheap.api_token = mask(&self.namecheap.api_token);
        masked.cloudflare.api_key = mask(&self.cloudflare.api_key);
        masked
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }

    /// Commented template written by `config init`.
    pub fn template() -> &'static str {
        r#"# namecloud configuration
# Values can also be set via NAMECLOUD_<SECTION>__<KEY> environment variables
# (e.g. NAMECLOUD_CLOUDFLARE__API_KEY) or command line flags.

[namecheap]
api_user = ""
api_token = ""
username = ""
# client_ip = "203.0.113.10"   # whitelisted IP; looked up automatically when unset
sandbox = false

[cloudflare]
api_key = ""
email = ""
account_id = ""
zone_type = "full"

[transfer]
contact_id = ""
years = 1
privacy = true
auto_renew = true
import_dns = true
"#
    }
}
