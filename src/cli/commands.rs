//! Command dispatch

use std::fs;
use std::io;

use clap::CommandFactory;
use tracing::debug;

use crate::application::services::PointReport;
use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{config_path, Settings};
use crate::domain::TransferOptions;
use crate::infrastructure::di::ServiceContainer;

/// Execute the parsed command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Point => cmd_point(cli),
        Commands::Transfer { domain, .. } => cmd_transfer(cli, domain),
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Completion { shell } => cmd_completion(*shell),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load(cli.config.as_deref())?;
    Ok(settings.with_overrides(cli.overrides()))
}

fn cmd_point(cli: &Cli) -> CliResult<()> {
    let container = ServiceContainer::bootstrap(load_settings(cli)?)?;
    let report = container.point_service().run()?;
    print_point_report(&report);
    Ok(())
}

fn print_point_report(report: &PointReport) {
    if report.planned.is_empty() {
        output::success("every domain already has a zone");
        return;
    }

    output::header("Point summary");
    for name in &report.nameservers_updated {
        output::success_detail(&format!("{}: zone created, nameservers updated", name));
    }
    for name in &report.nameservers_unchanged {
        output::success_detail(&format!("{}: zone created, nameservers already correct", name));
    }
    for failure in &report.failures {
        output::failure(&format!("{}: {}", failure.domain, failure.reason));
    }
    if !report.is_clean() {
        output::warning(&format!(
            "{} of {} domains need attention",
            report.failures.len(),
            report.planned.len()
        ));
    }
}

fn cmd_transfer(cli: &Cli, domain: &str) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let options = TransferOptions::from(&settings.transfer);
    debug!("cmd_transfer: domain={}, years={}", domain, options.years);

    let container = ServiceContainer::bootstrap(settings)?;
    container.transfer_service().run(domain, &options)?;

    output::success(&format!("transfer of {} initiated", domain.trim()));
    output::detail("Approve it from the confirmation email Cloudflare Registrar sends.");
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.masked().to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let path = resolve_config_path(cli)?;
            output::info(&path.display());
            if !path.exists() {
                output::detail("(not created; run `namecloud config init`)");
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = resolve_config_path(cli)?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config file already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_path_context("create config directory", parent)?;
            }
            fs::write(&path, Settings::template()).with_path_context("write config file", &path)?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}

fn resolve_config_path(cli: &Cli) -> CliResult<std::path::PathBuf> {
    config_path(cli.config.as_deref())
        .ok_or_else(|| CliError::Usage("cannot determine config directory; use --config".into()))
}

fn cmd_completion(shell: clap_complete::Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "namecloud", &mut io::stdout());
    Ok(())
}
