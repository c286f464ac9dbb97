//! # Demo Subcommand
//!
//! Walks the two reference scenarios against an in-memory registry and
//! prints each step. Nothing is read from or written to disk.
//!
//! - **Scenario A**: an institution issues a certificate, verifies it, then
//!   revokes it for misconduct.
//! - **Scenario B**: the administrator revokes an institution, which
//!   invalidates its certificate without touching it; the institution cannot
//!   revoke until reauthorized.

use anyhow::{bail, Result};

use arv_core::{CallerIdentity, InstitutionId};
use arv_registry::{IssueRequest, Registry};

/// Run both scenarios. Fails if any step deviates from the expected outcome.
pub fn run_demo() -> Result<u8> {
    let admin = CallerIdentity::new("admin")?;
    let registry = Registry::new(admin.clone());
    scenario_a(&registry, &admin)?;
    println!();
    scenario_b(&registry, &admin)?;
    println!();
    println!("Demo complete: {} events recorded.", registry.events().len());
    Ok(0)
}

fn scenario_a(registry: &Registry, admin: &CallerIdentity) -> Result<()> {
    println!("== Scenario A: issuer revokes its own certificate ==");
    let inst_a = CallerIdentity::new("InstA")?;

    registry.authorize_institution(admin, InstitutionId::new("InstA")?, "Hong Kong University")?;
    println!("admin authorized InstA as \"Hong Kong University\"");

    let x = registry
        .issue_certificate(
            &inst_a,
            IssueRequest {
                student_name: "John Doe".to_string(),
                student_id: "S123456".to_string(),
                degree: "Bachelor of Science".to_string(),
                major: "Computer Science".to_string(),
                issue_date: "2023-06-15".to_string(),
                graduation_date: "2023-06-30".to_string(),
                grade: 385,
            },
        )?
        .id;
    println!("InstA issued certificate {x} for John Doe");

    let verdict = registry.verify_certificate(&x)?;
    println!(
        "verify: is_valid={} institution_name=\"{}\"",
        verdict.is_valid, verdict.institution_name
    );
    if !verdict.is_valid {
        bail!("freshly issued certificate did not verify");
    }

    registry.revoke_certificate(&inst_a, &x, "Academic misconduct discovered")?;
    println!("InstA revoked {x}: Academic misconduct discovered");

    let verdict = registry.verify_certificate(&x)?;
    let stored = registry.certificate(&x)?;
    println!(
        "verify: is_valid={}; record: is_revoked={} reason=\"{}\"",
        verdict.is_valid, stored.is_revoked, stored.revocation_reason
    );
    if verdict.is_valid || !stored.is_revoked {
        bail!("revoked certificate still verifies");
    }
    Ok(())
}

fn scenario_b(registry: &Registry, admin: &CallerIdentity) -> Result<()> {
    println!("== Scenario B: institution revocation invalidates its certificates ==");
    let inst_b = CallerIdentity::new("InstB")?;

    registry.authorize_institution(admin, inst_b.institution(), "City University")?;
    println!("admin authorized InstB as \"City University\"");

    let y = registry
        .issue_certificate(
            &inst_b,
            IssueRequest {
                student_name: "Jane Smith".to_string(),
                student_id: "S789012".to_string(),
                degree: "Master of Business Administration".to_string(),
                major: "Finance".to_string(),
                issue_date: "2023-05-20".to_string(),
                graduation_date: "2023-06-01".to_string(),
                grade: 390,
            },
        )?
        .id;
    println!("InstB issued certificate {y} for Jane Smith");

    registry.revoke_institution(admin, inst_b.institution())?;
    let verdict = registry.verify_certificate(&y)?;
    let stored = registry.certificate(&y)?;
    println!(
        "admin revoked InstB; verify: is_valid={}; record: is_revoked={}",
        verdict.is_valid, stored.is_revoked
    );
    if verdict.is_valid || stored.is_revoked {
        bail!("institution revocation did not invalidate cleanly");
    }

    match registry.revoke_certificate(&inst_b, &y, "x") {
        Err(e) if e.is_state() => println!("InstB revoke attempt rejected: {e}"),
        Err(e) => bail!("unexpected rejection: {e}"),
        Ok(_) => bail!("deauthorized issuer was allowed to revoke"),
    }

    registry.authorize_institution(admin, inst_b.institution(), "City University")?;
    println!("admin reauthorized InstB");

    registry.revoke_certificate(&inst_b, &y, "valid now")?;
    let stored = registry.certificate(&y)?;
    println!(
        "InstB revoked {y}; record: is_revoked={} reason=\"{}\"",
        stored.is_revoked, stored.revocation_reason
    );
    if !stored.is_revoked {
        bail!("reauthorized issuer could not revoke");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_runs_clean() {
        assert_eq!(run_demo().unwrap(), 0);
    }
}
