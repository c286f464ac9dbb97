//! # Registry Property Tests
//!
//! Randomized checks of the institution round trip, identifier
//! uniqueness, and the monotonicity of revocation.

use std::collections::HashSet;

use proptest::prelude::*;

use arv_core::{CallerIdentity, InstitutionId};
use arv_registry::{IssueRequest, Registry};

fn admin() -> CallerIdentity {
    CallerIdentity::new("admin").unwrap()
}

fn identity() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,15}".prop_filter("not the administrator", |s| s != "admin")
}

fn issue_request() -> impl Strategy<Value = IssueRequest> {
    (
        "[A-Za-z ]{1,20}",
        "S[0-9]{6}",
        "[A-Za-z ]{1,20}",
        "[A-Za-z ]{1,20}",
        any::<u64>(),
    )
        .prop_map(|(student_name, student_id, degree, major, grade)| IssueRequest {
            student_name,
            student_id,
            degree,
            major,
            issue_date: "2023-06-15".to_string(),
            graduation_date: "2023-06-30".to_string(),
            grade,
        })
}

#[derive(Debug, Clone)]
enum Op {
    Authorize,
    RevokeInstitution,
    Revoke(usize),
    Issue,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Authorize),
        Just(Op::RevokeInstitution),
        (0usize..8).prop_map(Op::Revoke),
        Just(Op::Issue),
    ]
}

proptest! {
    /// After authorize(I, N), query(I) == (N, true).
    #[test]
    fn authorize_then_query_round_trips(id in identity(), name in "[ -~]{0,40}") {
        let registry = Registry::new(admin());
        let institution = InstitutionId::new(&id).unwrap();
        registry.authorize_institution(&admin(), institution.clone(), &name).unwrap();
        let record = registry.institution(&institution);
        prop_assert_eq!(record.name, name);
        prop_assert!(record.authorized);
    }

    /// Repeating the same request never reuses an identifier.
    #[test]
    fn identical_issuance_yields_unique_ids(request in issue_request(), count in 2usize..12) {
        let registry = Registry::new(admin());
        let issuer = CallerIdentity::new("InstA").unwrap();
        registry
            .authorize_institution(&admin(), issuer.institution(), "Hong Kong University")
            .unwrap();
        let mut ids = HashSet::new();
        for _ in 0..count {
            let cert = registry.issue_certificate(&issuer, request.clone()).unwrap();
            prop_assert!(ids.insert(cert.id));
        }
    }

    /// Once revoked, a certificate stays revoked whatever happens next,
    /// and no revoked certificate ever verifies as valid.
    #[test]
    fn revocation_is_monotonic(request in issue_request(), ops in prop::collection::vec(op(), 1..40)) {
        let registry = Registry::new(admin());
        let issuer = CallerIdentity::new("InstA").unwrap();
        registry
            .authorize_institution(&admin(), issuer.institution(), "Hong Kong University")
            .unwrap();

        let mut issued = Vec::new();
        let mut revoked = HashSet::new();
        for op in ops {
            match op {
                Op::Authorize => {
                    registry
                        .authorize_institution(&admin(), issuer.institution(), "Hong Kong University")
                        .unwrap();
                }
                Op::RevokeInstitution => {
                    registry.revoke_institution(&admin(), issuer.institution()).unwrap();
                }
                Op::Issue => {
                    if let Ok(cert) = registry.issue_certificate(&issuer, request.clone()) {
                        issued.push(cert.id);
                    }
                }
                Op::Revoke(i) => {
                    if let Some(id) = issued.get(i) {
                        if registry.revoke_certificate(&issuer, id, "withdrawn").is_ok() {
                            revoked.insert(*id);
                        }
                    }
                }
            }

            let authorized = registry.institution(&issuer.institution()).authorized;
            for id in &issued {
                let stored = registry.certificate(id).unwrap();
                prop_assert_eq!(stored.is_revoked, revoked.contains(id));
                let verdict = registry.verify_certificate(id).unwrap();
                prop_assert_eq!(verdict.is_valid, !stored.is_revoked && authorized);
            }
        }

        let events = registry.events();
        prop_assert!(events.iter().enumerate().all(|(i, r)| r.sequence == i as u64 + 1));
    }
}
