//! # Institution Subcommand
//!
//! Administrator operations over the institution registry, plus public
//! lookups.
//!
//! - `authorize <id> <name>`: authorize or rename an institution.
//! - `revoke <id>`: clear an institution's authorization.
//! - `show <id>`: current record (zero-value if never authorized).
//! - `list`: every institution ever authorized.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use arv_core::InstitutionId;
use arv_registry::Institution;

use crate::config::Settings;
use crate::{emit, store};

/// Arguments for the `arv institution` subcommand.
#[derive(Args, Debug)]
pub struct InstitutionArgs {
    #[command(subcommand)]
    pub command: InstitutionCommand,
}

/// Institution subcommands.
#[derive(Subcommand, Debug)]
pub enum InstitutionCommand {
    /// Authorize an institution (administrator only). Re-authorizing renames.
    Authorize {
        /// Institution identity.
        id: InstitutionId,
        /// Display name.
        name: String,
    },

    /// Revoke an institution's authorization (administrator only).
    Revoke {
        /// Institution identity.
        id: InstitutionId,
    },

    /// Show an institution's current record.
    Show {
        /// Institution identity.
        id: InstitutionId,
    },

    /// List all known institutions.
    List,
}

#[derive(Debug, Serialize)]
struct InstitutionView<'a> {
    institution: &'a InstitutionId,
    name: &'a str,
    authorized: bool,
}

impl<'a> InstitutionView<'a> {
    fn new(institution: &'a InstitutionId, record: &'a Institution) -> Self {
        Self {
            institution,
            name: &record.name,
            authorized: record.authorized,
        }
    }
}

/// Execute the institution subcommand.
pub fn run_institution(args: &InstitutionArgs, settings: &Settings) -> Result<u8> {
    match &args.command {
        InstitutionCommand::Authorize { id, name } => {
            let caller = settings.caller()?;
            let record = store::update(&settings.state_path, |registry| {
                Ok(registry.authorize_institution(caller, id.clone(), name)?)
            })?;
            emit(settings, &record, |r| {
                format!("OK: authorized {id} as \"{name}\" (event #{})", r.sequence)
            })?;
        }

        InstitutionCommand::Revoke { id } => {
            let caller = settings.caller()?;
            let record = store::update(&settings.state_path, |registry| {
                Ok(registry.revoke_institution(caller, id.clone())?)
            })?;
            emit(settings, &record, |r| {
                format!("OK: revoked {id} (event #{})", r.sequence)
            })?;
        }

        InstitutionCommand::Show { id } => {
            let registry = store::load(&settings.state_path)?;
            let record = registry.institution(id);
            emit(settings, &InstitutionView::new(id, &record), render)?;
        }

        InstitutionCommand::List => {
            let registry = store::load(&settings.state_path)?;
            let listing = registry.institutions();
            let views: Vec<InstitutionView<'_>> = listing
                .iter()
                .map(|(id, record)| InstitutionView::new(id, record))
                .collect();
            emit(settings, &views, |views| {
                if views.is_empty() {
                    return "(no institutions)".to_string();
                }
                views.iter().map(render).collect::<Vec<_>>().join("\n")
            })?;
        }
    }
    Ok(0)
}

fn render(view: &InstitutionView<'_>) -> String {
    let status = if view.authorized {
        "authorized"
    } else {
        "not authorized"
    };
    if view.name.is_empty() {
        format!("{}: {status}", view.institution)
    } else {
        format!("{}: \"{}\" ({status})", view.institution, view.name)
    }
}
