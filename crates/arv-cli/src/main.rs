//! # arv CLI entry point
//!
//! Parses command-line arguments, resolves settings, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arv_cli::certificate::{run_certificate, CertificateArgs};
use arv_cli::config::{CliConfig, Settings};
use arv_cli::demo::run_demo;
use arv_cli::institution::{run_institution, InstitutionArgs};
use arv_cli::verify::{run_events, run_verify, EventsArgs, VerifyArgs};
use arv_cli::{run_init, InitArgs};

/// Academic record registry.
///
/// An administrator authorizes institutions; institutions issue and revoke
/// certificates; anyone can verify one.
#[derive(Parser, Debug)]
#[command(name = "arv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Registry snapshot file.
    #[arg(long, global = true, env = "ARV_STATE")]
    state: Option<PathBuf>,

    /// Identity to act as.
    #[arg(long = "as", global = true, env = "ARV_CALLER", value_name = "IDENTITY")]
    caller: Option<String>,

    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty registry snapshot.
    Init(InitArgs),

    /// Institution authorization management.
    Institution(InstitutionArgs),

    /// Certificate issuance, revocation, and lookup.
    Certificate(CertificateArgs),

    /// Check whether a certificate is currently valid.
    Verify(VerifyArgs),

    /// Print the event history as JSON lines.
    Events(EventsArgs),

    /// Run the reference scenarios against an in-memory registry.
    Demo,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("arv CLI v{} starting", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(cli.state, cli.caller, &config, cli.json)?;
    tracing::debug!(state = %settings.state_path.display(), "resolved settings");

    match cli.command {
        Commands::Init(args) => run_init(&args, &settings),
        Commands::Institution(args) => run_institution(&args, &settings),
        Commands::Certificate(args) => run_certificate(&args, &settings),
        Commands::Verify(args) => run_verify(&args, &settings),
        Commands::Events(args) => run_events(&args, &settings),
        Commands::Demo => run_demo(),
    }
}
