//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::SettingsOverrides;

/// Point Namecheap domains at Cloudflare and transfer them to Cloudflare Registrar
#[derive(Parser, Debug)]
#[command(name = "namecloud")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: $XDG_CONFIG_HOME/namecloud/namecloud.toml)
    #[arg(long, env = "NAMECLOUD_CONFIG", global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Namecheap API user
    #[arg(long = "namecheap.api-user", global = true)]
    pub namecheap_api_user: Option<String>,

    /// Namecheap API token
    #[arg(long = "namecheap.api-token", global = true)]
    pub namecheap_api_token: Option<String>,

    /// Namecheap username (default: API user)
    #[arg(long = "namecheap.username", global = true)]
    pub namecheap_username: Option<String>,

    /// Whitelisted client IP (default: public IP lookup)
    #[arg(long = "namecheap.client-ip", global = true)]
    pub namecheap_client_ip: Option<String>,

    /// Use the Namecheap sandbox API
    #[arg(long = "namecheap.sandbox", global = true)]
    pub namecheap_sandbox: bool,

    /// Cloudflare global API key
    #[arg(long = "cloudflare.api-key", global = true)]
    pub cloudflare_api_key: Option<String>,

    /// Cloudflare account email
    #[arg(long = "cloudflare.email", global = true)]
    pub cloudflare_email: Option<String>,

    /// Cloudflare account id
    #[arg(long = "cloudflare.account-id", global = true)]
    pub cloudflare_account_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create missing Cloudflare zones and point nameservers at them
    Point,

    /// Transfer a domain to Cloudflare Registrar
    Transfer {
        /// Domain to transfer
        domain: String,

        /// Registrant contact id at Cloudflare
        #[arg(long = "cloudflare.contact-id")]
        contact_id: Option<String>,

        /// Registration years to add [default: 1]
        #[arg(long = "cloudflare.years")]
        years: Option<u32>,

        /// Enable WHOIS privacy [default: true]
        #[arg(long = "cloudflare.privacy", action = ArgAction::Set)]
        privacy: Option<bool>,

        /// Enable auto-renew [default: true]
        #[arg(long = "cloudflare.auto-renew", action = ArgAction::Set)]
        auto_renew: Option<bool>,

        /// Import DNS records [default: true]
        #[arg(long = "cloudflare.import", action = ArgAction::Set)]
        import_dns: Option<bool>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged settings (secrets masked)
    Show,

    /// Show config file path
    Path,

    /// Create config file from template
    Init {
        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Settings given as flags.
    pub fn overrides(&self) -> SettingsOverrides {
        let mut overrides = SettingsOverrides {
            namecheap_api_user: self.namecheap_api_user.clone(),
            namecheap_api_token: self.namecheap_api_token.clone(),
            namecheap_username: self.namecheap_username.clone(),
            namecheap_client_ip: self.namecheap_client_ip.clone(),
            namecheap_sandbox: self.namecheap_sandbox.then_some(true),
            cloudflare_api_key: self.cloudflare_api_key.clone(),
            cloudflare_email: self.cloudflare_email.clone(),
            cloudflare_account_id: self.cloudflare_account_id.clone(),
            ..Default::default()
        };

        if let Commands::Transfer {
            contact_id,
            years,
            privacy,
            auto_renew,
            import_dns,
            ..
        } = &self.command
        {
            overrides.contact_id = contact_id.clone();
            overrides.years = *years;
            overrides.privacy = *privacy;
            overrides.auto_renew = *auto_renew;
            overrides.import_dns = *import_dns;
        }
        overrides
    }
}
