//! # Certificate Subcommand
//!
//! Issuer operations over the certificate registry, plus public lookups.
//!
//! - `issue --student-name ... --grade ...`: issue as the acting institution.
//! - `revoke <id> --reason ...`: revoke a certificate the caller issued.
//! - `show <id>`: the stored record.
//! - `list [--issuer <id>]`: certificates in issuance order.

use anyhow::Result;
use clap::{Args, Subcommand};

use arv_core::{CertificateId, InstitutionId};
use arv_registry::{Certificate, IssueRequest};

use crate::config::Settings;
use crate::{emit, store};

/// Arguments for the `arv certificate` subcommand.
#[derive(Args, Debug)]
pub struct CertificateArgs {
    #[command(subcommand)]
    pub command: CertificateCommand,
}

/// Certificate subcommands.
#[derive(Subcommand, Debug)]
pub enum CertificateCommand {
    /// Issue a certificate as the acting institution. Prints the new id.
    Issue(IssueArgs),

    /// Revoke a certificate (original issuer only, while authorized).
    Revoke {
        /// Certificate identifier (64 hex digits, optional 0x prefix).
        id: CertificateId,
        /// Reason recorded on the certificate.
        #[arg(long)]
        reason: String,
    },

    /// Show a certificate record.
    Show {
        /// Certificate identifier.
        id: CertificateId,
    },

    /// List certificates in issuance order.
    List {
        /// Only certificates issued by this institution.
        #[arg(long)]
        issuer: Option<InstitutionId>,
    },
}

/// Fields for `arv certificate issue`.
#[derive(Args, Debug, Clone)]
pub struct IssueArgs {
    #[arg(long)]
    pub student_name: String,
    #[arg(long)]
    pub student_id: String,
    #[arg(long)]
    pub degree: String,
    #[arg(long)]
    pub major: String,
    /// Opaque date string, e.g. 2023-06-15.
    #[arg(long)]
    pub issue_date: String,
    /// Opaque date string, e.g. 2023-06-30.
    #[arg(long)]
    pub graduation_date: String,
    /// Unscaled grade, e.g. 385 for 3.85.
    #[arg(long)]
    pub grade: u64,
}

impl From<IssueArgs> for IssueRequest {
    fn from(args: IssueArgs) -> Self {
        IssueRequest {
            student_name: args.student_name,
            student_id: args.student_id,
            degree: args.degree,
            major: args.major,
            issue_date: args.issue_date,
            graduation_date: args.graduation_date,
            grade: args.grade,
        }
    }
}

/// Execute the certificate subcommand.
pub fn run_certificate(args: &CertificateArgs, settings: &Settings) -> Result<u8> {
    match &args.command {
        CertificateCommand::Issue(fields) => {
            let caller = settings.caller()?;
            let certificate = store::update(&settings.state_path, |registry| {
                Ok(registry.issue_certificate(caller, fields.clone().into())?)
            })?;
            emit(settings, &certificate, |c| c.id.to_hex())?;
        }

        CertificateCommand::Revoke { id, reason } => {
            let caller = settings.caller()?;
            let certificate = store::update(&settings.state_path, |registry| {
                Ok(registry.revoke_certificate(caller, id, reason)?)
            })?;
            emit(settings, &certificate, |c| {
                format!("OK: revoked {} ({})", c.id, c.revocation_reason)
            })?;
        }

        CertificateCommand::Show { id } => {
            let registry = store::load(&settings.state_path)?;
            let certificate = registry.certificate(id)?;
            emit(settings, &certificate, render)?;
        }

        CertificateCommand::List { issuer } => {
            let registry = store::load(&settings.state_path)?;
            let certificates: Vec<Certificate> = registry
                .certificates()
                .into_iter()
                .filter(|c| issuer.as_ref().map_or(true, |i| &c.issuer == i))
                .collect();
            emit(settings, &certificates, |list| {
                if list.is_empty() {
                    return "(no certificates)".to_string();
                }
                list.iter()
                    .map(|c| {
                        let status = if c.is_revoked { "revoked" } else { "active" };
                        format!("{}  {}  {}  [{status}]", c.id, c.issuer, c.student_name)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
    }
    Ok(0)
}

/// Multi-line human rendering of a certificate record.
pub fn render(c: &Certificate) -> String {
    let mut out = format!(
        "Certificate {}\n  Student:      {} ({})\n  Degree:       {}, {}\n  Issued:       {}\n  Graduated:    {}\n  Grade:        {}\n  Institution:  {} ({})\n  Recorded at:  {}",
        c.id,
        c.student_name,
        c.student_id,
        c.degree,
        c.major,
        c.issue_date,
        c.graduation_date,
        c.grade,
        c.institution_name,
        c.issuer,
        c.recorded_at,
    );
    if c.is_revoked {
        out.push_str(&format!("\n  Revoked:      yes ({})", c.revocation_reason));
        if let Some(at) = &c.revoked_at {
            out.push_str(&format!("\n  Revoked at:   {at}"));
        }
    } else {
        out.push_str("\n  Revoked:      no");
    }
    out
}
