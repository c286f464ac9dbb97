//! # Public Queries
//!
//! `verify <id>` prints the live validity verdict. `events [--since N]`
//! prints the event history as JSON lines. Neither needs a caller identity.

use anyhow::Result;
use clap::Args;

use arv_core::CertificateId;
use arv_registry::Verification;

use crate::config::Settings;
use crate::{emit, store};

/// Arguments for `arv verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Certificate identifier.
    pub id: CertificateId,
}

/// Arguments for `arv events`.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Only events with a sequence number greater than this.
    #[arg(long, default_value_t = 0)]
    pub since: u64,
}

/// Execute `arv verify`.
pub fn run_verify(args: &VerifyArgs, settings: &Settings) -> Result<u8> {
    let registry = store::load(&settings.state_path)?;
    let verdict = registry.verify_certificate(&args.id)?;
    emit(settings, &verdict, render)?;
    Ok(0)
}

/// Execute `arv events`.
pub fn run_events(args: &EventsArgs, settings: &Settings) -> Result<u8> {
    let registry = store::load(&settings.state_path)?;
    for record in registry.events_since(args.since) {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(0)
}

fn render(v: &Verification) -> String {
    let head = if v.is_valid { "VALID" } else { "INVALID" };
    format!(
        "{head}: {}\n  Institution:  {} ({})\n  Status:       {}",
        v.certificate,
        v.institution_name,
        v.institution,
        v.summary()
    )
}
