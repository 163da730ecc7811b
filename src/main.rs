//! Bootstrap a site host: link the deploy repo, make sure puppet is
//! recent enough, put the site source in place, write host facts and
//! apply the site manifest.

mod error;
mod model;
mod provision;
mod shell;
mod step;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use model::config::{self, AppConfig};
use model::mode::InstallType;
use provision::Provisioner;
use shell::SystemRunner;

/// Configure a site installation using puppet, as a development or
/// production setup.
#[derive(Parser, Debug)]
#[command(name = "site-provision", version, about)]
struct Cli {
    /// Type of installation to deploy
    #[arg(long = "type", value_enum, default_value_t = InstallType::Auto)]
    install_type: InstallType,

    /// Extra TOML file layered over the built-in and user configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("provisioning stopped: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let app_config = AppConfig::load(cli.config.as_deref())?;

    let cwd = std::env::current_dir()
        .and_then(|dir| dir.canonicalize())
        .context("cannot determine working directory")?;
    let settings = app_config.resolve(&config::home_dir()?, config::current_user()?, &cwd)?;

    let mut provisioner = Provisioner::new(settings, SystemRunner);
    provisioner.run(cli.install_type)?;
    Ok(())
}

/// Console output is message-only; a daily log file keeps full records.
fn init_logging() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("site_provision=info"));
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(false);

    let log_dir = directories::ProjectDirs::from("", "", "site-provision")
        .map(|d| d.data_dir().to_path_buf())
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry().with(filter).with(console).init();
        return None;
    };

    let file_appender = tracing_appender::rolling::daily(&log_dir, "site-provision.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();
    Some(guard)
}
