//! # arv-cli: Command-Line Driver for the Academic Record Registry
//!
//! Provides the `arv` binary. Each invocation loads the registry from a
//! local JSON snapshot, performs one operation as the identity given by
//! `--as`, and writes the snapshot back if the operation mutated state.
//!
//! ## Subcommands
//!
//! - `arv init`: create an empty registry with its administrator.
//! - `arv institution`: authorize, revoke, show, list institutions.
//! - `arv certificate`: issue, revoke, show, list certificates.
//! - `arv verify`: public validity check.
//! - `arv events`: event history as JSON lines.
//! - `arv demo`: run the reference scenarios in memory.
//!
//! ```bash
//! arv init --admin admin
//! arv --as admin institution authorize InstA "Hong Kong University"
//! arv --as InstA certificate issue --student-name "John Doe" --student-id S123456 \
//!     --degree "Bachelor of Science" --major "Computer Science" \
//!     --issue-date 2023-06-15 --graduation-date 2023-06-30 --grade 385
//! arv verify 0x…
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - Handlers delegate to `arv-registry`; no registry rules live here.

pub mod certificate;
pub mod config;
pub mod demo;
pub mod institution;
pub mod store;
pub mod verify;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use arv_core::CallerIdentity;

use crate::config::Settings;

/// Print `value` as pretty JSON or as the text `render` produces.
pub fn emit<T: Serialize>(
    settings: &Settings,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> Result<()> {
    if settings.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

/// Arguments for `arv init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Administrator identity. Falls back to the config file, then `--as`.
    #[arg(long)]
    pub admin: Option<CallerIdentity>,

    /// Overwrite an existing snapshot.
    #[arg(long)]
    pub force: bool,
}

/// Execute `arv init`.
pub fn run_init(args: &InitArgs, settings: &Settings) -> Result<u8> {
    let administrator = args
        .admin
        .clone()
        .or_else(|| settings.administrator.clone())
        .or_else(|| settings.caller.clone())
        .context("no administrator identity: pass --admin or set administrator in the config file")?;
    store::create(&settings.state_path, administrator.clone(), args.force)?;
    tracing::info!(path = %settings.state_path.display(), "initialized registry state");
    println!(
        "OK: initialized {} with administrator {administrator}",
        settings.state_path.display()
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(state_path: PathBuf, caller: Option<&str>) -> Settings {
        Settings {
            state_path,
            caller: caller.map(|c| CallerIdentity::new(c).unwrap()),
            administrator: None,
            json: false,
        }
    }

    #[test]
    fn test_init_prefers_explicit_admin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let args = InitArgs {
            admin: Some(CallerIdentity::new("root").unwrap()),
            force: false,
        };
        run_init(&args, &settings(path.clone(), Some("InstA"))).unwrap();
        assert_eq!(store::load(&path).unwrap().administrator().as_str(), "root");
    }

    #[test]
    fn test_init_falls_back_to_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let args = InitArgs {
            admin: None,
            force: false,
        };
        run_init(&args, &settings(path.clone(), Some("admin"))).unwrap();
        assert_eq!(store::load(&path).unwrap().administrator().as_str(), "admin");
    }

    #[test]
    fn test_init_without_any_identity_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            admin: None,
            force: false,
        };
        assert!(run_init(&args, &settings(dir.path().join("state.json"), None)).is_err());
    }

    #[test]
    fn test_public_modules_are_accessible() {
        let _ = std::any::type_name::<certificate::CertificateArgs>();
        let _ = std::any::type_name::<institution::InstitutionArgs>();
        let _ = std::any::type_name::<verify::VerifyArgs>();
        let _ = std::any::type_name::<verify::EventsArgs>();
    }
}
