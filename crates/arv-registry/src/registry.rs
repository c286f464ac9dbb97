//! # Registry Facade
//!
//! [`Registry`] is the public surface the hosting environment calls. It
//! owns both stores and the event log behind one `parking_lot::RwLock`.
//!
//! ## Serialization contract
//!
//! Every mutation holds the write lock for its whole run: guard check,
//! store update, event append, broadcast. Mutations are therefore totally
//! ordered and each one commits in full or not at all. A rejected
//! operation leaves both stores untouched and appends no event.
//!
//! Reads (`institution`, `certificate`, `verify_certificate`, ...) take the
//! read lock and always observe the latest committed state. They may run
//! concurrently with each other.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use arv_core::{CallerIdentity, CertificateId, InstitutionId, RegistryError};

use crate::certificate::{Certificate, CertificateRegistry, IssueRequest};
use crate::events::{EventLog, EventRecord};
use crate::institution::{Institution, InstitutionRegistry};
use crate::verification::{self, Verification};

/// Current on-disk snapshot layout.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Errors restoring a registry from a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot was written by an incompatible version.
    #[error("unsupported snapshot format version {0} (expected {SNAPSHOT_FORMAT_VERSION})")]
    UnsupportedVersion(u32),

    /// Certificate identifiers repeat, or the sequence counter was rewound.
    #[error("certificate records are inconsistent: duplicate id or rewound sequence")]
    InconsistentCertificates,

    /// A certificate names an issuer the institution registry never saw.
    #[error("certificate {certificate} names unknown issuer {issuer}")]
    UnknownIssuer {
        /// The certificate.
        certificate: CertificateId,
        /// Its recorded issuer.
        issuer: InstitutionId,
    },

    /// Event sequence numbers are not 1, 2, 3, ...
    #[error("event history has gaps or is out of order")]
    EventGap,
}

/// Persisted registry state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Layout version.
    pub format_version: u32,
    /// Administrator and institution records.
    #[serde(flatten)]
    pub institutions: InstitutionRegistry,
    /// Certificates in issuance order.
    pub certificates: Vec<Certificate>,
    /// Next identifier allocation sequence.
    pub next_sequence: u64,
    /// Full event history.
    pub events: Vec<EventRecord>,
}

#[derive(Debug)]
struct RegistryState {
    institutions: InstitutionRegistry,
    certificates: CertificateRegistry,
    events: EventLog,
}

/// The credential registry.
#[derive(Debug)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    /// An empty registry administered by `administrator`.
    pub fn new(administrator: CallerIdentity) -> Self {
        tracing::info!(administrator = %administrator, "registry created");
        Self {
            state: RwLock::new(RegistryState {
                institutions: InstitutionRegistry::new(administrator),
                certificates: CertificateRegistry::new(),
                events: EventLog::new(),
            }),
        }
    }

    /// The administrator identity fixed at creation.
    pub fn administrator(&self) -> CallerIdentity {
        self.state.read().institutions.administrator().clone()
    }

    // ── Institution Registry ─────────────────────────────────────────

    /// Authorize (or re-authorize under a new name) an institution.
    pub fn authorize_institution(
        &self,
        caller: &CallerIdentity,
        institution: InstitutionId,
        name: &str,
    ) -> Result<EventRecord, RegistryError> {
        let mut state = self.state.write();
        match state.institutions.authorize(caller, institution.clone(), name) {
            Ok(event) => {
                tracing::info!(institution = %institution, name, "institution authorized");
                Ok(state.events.append(event))
            }
            Err(e) => Err(denied("authorize_institution", caller, e)),
        }
    }

    /// Clear an institution's authorization.
    pub fn revoke_institution(
        &self,
        caller: &CallerIdentity,
        institution: InstitutionId,
    ) -> Result<EventRecord, RegistryError> {
        let mut state = self.state.write();
        match state.institutions.revoke(caller, institution.clone()) {
            Ok(event) => {
                tracing::info!(institution = %institution, "institution revoked");
                Ok(state.events.append(event))
            }
            Err(e) => Err(denied("revoke_institution", caller, e)),
        }
    }

    /// Current `(name, authorized)` record; zero-value if never authorized.
    pub fn institution(&self, institution: &InstitutionId) -> Institution {
        tracing::debug!(institution = %institution, "institution query");
        self.state.read().institutions.query(institution)
    }

    /// Every institution ever authorized, ordered by identity.
    pub fn institutions(&self) -> Vec<(InstitutionId, Institution)> {
        self.state
            .read()
            .institutions
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    // ── Certificate Registry ─────────────────────────────────────────

    /// Issue a certificate as `caller`. Returns the stored record.
    pub fn issue_certificate(
        &self,
        caller: &CallerIdentity,
        request: IssueRequest,
    ) -> Result<Certificate, RegistryError> {
        let mut state = self.state.write();
        let state = &mut *state;
        match state.certificates.issue(caller, request, &state.institutions) {
            Ok((certificate, event)) => {
                tracing::info!(
                    certificate = %certificate.id,
                    issuer = %certificate.issuer,
                    "certificate issued"
                );
                state.events.append(event);
                Ok(certificate)
            }
            Err(e) => Err(denied("issue_certificate", caller, e)),
        }
    }

    /// Revoke a certificate as `caller`. Returns the updated record.
    pub fn revoke_certificate(
        &self,
        caller: &CallerIdentity,
        id: &CertificateId,
        reason: &str,
    ) -> Result<Certificate, RegistryError> {
        let mut state = self.state.write();
        let state = &mut *state;
        let event = state
            .certificates
            .revoke(caller, id, reason, &state.institutions)
            .map_err(|e| denied("revoke_certificate", caller, e))?;
        tracing::info!(certificate = %id, reason, "certificate revoked");
        state.events.append(event);
        state.certificates.get(id).cloned()
    }

    /// The stored record for `id`.
    pub fn certificate(&self, id: &CertificateId) -> Result<Certificate, RegistryError> {
        tracing::debug!(certificate = %id, "certificate query");
        self.state.read().certificates.get(id).cloned()
    }

    /// Every certificate in issuance order.
    pub fn certificates(&self) -> Vec<Certificate> {
        self.state.read().certificates.records().cloned().collect()
    }

    /// Identifiers issued by `issuer`, in issuance order.
    pub fn certificates_issued_by(&self, issuer: &InstitutionId) -> Vec<CertificateId> {
        self.state.read().certificates.issued_by(issuer)
    }

    // ── Verification Engine ──────────────────────────────────────────

    /// Live validity verdict for `id`.
    pub fn verify_certificate(&self, id: &CertificateId) -> Result<Verification, RegistryError> {
        let state = self.state.read();
        let verdict = verification::verify(&state.certificates, &state.institutions, id)?;
        tracing::debug!(certificate = %id, valid = verdict.is_valid, "certificate verified");
        Ok(verdict)
    }

    // ── Events ───────────────────────────────────────────────────────

    /// The full event history.
    pub fn events(&self) -> Vec<EventRecord> {
        self.state.read().events.records().to_vec()
    }

    /// Events with a sequence number greater than `sequence`.
    pub fn events_since(&self, sequence: u64) -> Vec<EventRecord> {
        self.state.read().events.since(sequence).to_vec()
    }

    /// Live feed of events committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.state.read().events.subscribe()
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Capture the full persisted state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            institutions: state.institutions.clone(),
            certificates: state.certificates.records().cloned().collect(),
            next_sequence: state.certificates.next_sequence(),
            events: state.events.records().to_vec(),
        }
    }

    /// Restore a registry, checking the snapshot's invariants.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, SnapshotError> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.format_version));
        }
        if let Some(orphan) = snapshot
            .certificates
            .iter()
            .find(|c| snapshot.institutions.get(&c.issuer).is_none())
        {
            return Err(SnapshotError::UnknownIssuer {
                certificate: orphan.id,
                issuer: orphan.issuer.clone(),
            });
        }
        let certificates =
            CertificateRegistry::from_records(snapshot.certificates, snapshot.next_sequence)
                .ok_or(SnapshotError::InconsistentCertificates)?;
        let events = EventLog::from_records(snapshot.events);
        if !events.is_contiguous() {
            return Err(SnapshotError::EventGap);
        }
        tracing::debug!(
            institutions = snapshot.institutions.len(),
            certificates = certificates.len(),
            events = events.len(),
            "registry restored from snapshot"
        );
        Ok(Self {
            state: RwLock::new(RegistryState {
                institutions: snapshot.institutions,
                certificates,
                events,
            }),
        })
    }
}

fn denied(operation: &str, caller: &CallerIdentity, error: RegistryError) -> RegistryError {
    tracing::warn!(operation, caller = %caller, kind = error.kind(), reason = %error, "operation rejected");
    error
}

// Compile-time check that the facade can be shared across host threads.
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Registry>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RegistryEvent;
    use arv_core::{AccessDenied, StateViolation};

    fn caller(id: &str) -> CallerIdentity {
        CallerIdentity::new(id).unwrap()
    }

    fn inst(id: &str) -> InstitutionId {
        InstitutionId::new(id).unwrap()
    }

    fn request(student: &str) -> IssueRequest {
        IssueRequest {
            student_name: student.to_string(),
            student_id: "S123456".to_string(),
            degree: "Bachelor of Science".to_string(),
            major: "Computer Science".to_string(),
            issue_date: "2023-06-15".to_string(),
            graduation_date: "2023-06-30".to_string(),
            grade: 385,
        }
    }

    fn registry_with_inst_a() -> Registry {
        let registry = Registry::new(caller("admin"));
        registry
            .authorize_institution(&caller("admin"), inst("InstA"), "Hong Kong University")
            .unwrap();
        registry
    }

    #[test]
    fn test_mutations_append_events_in_order() {
        let registry = registry_with_inst_a();
        let cert = registry
            .issue_certificate(&caller("InstA"), request("John Doe"))
            .unwrap();
        registry
            .revoke_certificate(&caller("InstA"), &cert.id, "Academic misconduct discovered")
            .unwrap();
        registry
            .revoke_institution(&caller("admin"), inst("InstA"))
            .unwrap();

        let names: Vec<&str> = registry.events().iter().map(|r| r.event.name()).collect();
        assert_eq!(
            names,
            vec![
                "InstitutionAuthorized",
                "CertificateIssued",
                "CertificateRevoked",
                "InstitutionRevoked"
            ]
        );
        let seqs: Vec<u64> = registry.events().iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rejected_operations_emit_nothing() {
        let registry = registry_with_inst_a();
        let cert = registry
            .issue_certificate(&caller("InstA"), request("John Doe"))
            .unwrap();
        let before = registry.events().len();

        assert!(registry
            .authorize_institution(&caller("InstA"), inst("InstB"), "City University")
            .is_err());
        assert!(registry.revoke_institution(&caller("InstB"), inst("InstA")).is_err());
        assert!(registry
            .issue_certificate(&caller("InstB"), request("Jane Smith"))
            .is_err());
        assert!(registry
            .revoke_certificate(&caller("InstB"), &cert.id, "x")
            .is_err());
        assert!(registry
            .revoke_certificate(&caller("InstA"), &CertificateId::from_bytes([9; 32]), "x")
            .is_err());

        assert_eq!(registry.events().len(), before);
        assert!(!registry.certificate(&cert.id).unwrap().is_revoked);
    }

    #[test]
    fn test_issue_event_carries_new_id() {
        let registry = registry_with_inst_a();
        let mut rx = registry.subscribe();
        let cert = registry
            .issue_certificate(&caller("InstA"), request("John Doe"))
            .unwrap();
        let record = rx.try_recv().unwrap();
        match record.event {
            RegistryEvent::CertificateIssued { certificate, issuer, .. } => {
                assert_eq!(certificate, cert.id);
                assert_eq!(issuer, inst("InstA"));
            }
            other => panic!("Expected CertificateIssued, got: {other:?}"),
        }
    }

    #[test]
    fn test_revoke_certificate_error_kinds() {
        let registry = registry_with_inst_a();
        registry
            .authorize_institution(&caller("admin"), inst("InstB"), "City University")
            .unwrap();
        let cert = registry
            .issue_certificate(&caller("InstA"), request("John Doe"))
            .unwrap();

        assert_eq!(
            registry.revoke_certificate(&caller("InstB"), &cert.id, "x"),
            Err(RegistryError::Authorization(AccessDenied::NotIssuer))
        );
        registry
            .revoke_institution(&caller("admin"), inst("InstA"))
            .unwrap();
        assert_eq!(
            registry.revoke_certificate(&caller("InstA"), &cert.id, "x"),
            Err(RegistryError::State(StateViolation::IssuerNotAuthorized))
        );
        // Non-issuer is still an authorization failure even when the issuer is deauthorized.
        assert!(registry
            .revoke_certificate(&caller("InstB"), &cert.id, "x")
            .unwrap_err()
            .is_authorization());
    }

    #[test]
    fn test_institutions_listing() {
        let registry = registry_with_inst_a();
        registry
            .authorize_institution(&caller("admin"), inst("InstB"), "City University")
            .unwrap();
        registry
            .revoke_institution(&caller("admin"), inst("InstB"))
            .unwrap();
        let listing = registry.institutions();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].0, inst("InstA"));
        assert!(listing[0].1.authorized);
        assert_eq!(listing[1].1.name, "City University");
        assert!(!listing[1].1.authorized);
    }

    #[test]
    fn test_revoking_unknown_institution_is_not_listed() {
        let registry = registry_with_inst_a();
        let record = registry
            .revoke_institution(&caller("admin"), inst("ghost"))
            .unwrap();
        assert_eq!(record.sequence, 2);
        let listing = registry.institutions();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].0, inst("InstA"));
        assert!(!registry.institution(&inst("ghost")).authorized);
    }

    #[test]
    fn test_snapshot_restores_state_and_counter() {
        let registry = registry_with_inst_a();
        let first = registry
            .issue_certificate(&caller("InstA"), request("John Doe"))
            .unwrap();
        registry
            .revoke_certificate(&caller("InstA"), &first.id, "typo")
            .unwrap();

        let json = serde_json::to_string(&registry.snapshot()).unwrap();
        let restored =
            Registry::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(restored.administrator(), caller("admin"));
        assert_eq!(
            restored.certificate(&first.id).unwrap(),
            registry.certificate(&first.id).unwrap()
        );
        assert_eq!(restored.events(), registry.events());
        assert_eq!(restored.institution(&inst("InstA")), registry.institution(&inst("InstA")));

        // The sequence counter is carried over: an identical request gets a fresh id.
        let second = restored
            .issue_certificate(&caller("InstA"), request("John Doe"))
            .unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(restored.events().last().unwrap().sequence, 4);
    }

    #[test]
    fn test_snapshot_rejects_non_utc_timestamp() {
        let mut json = serde_json::to_value(registry_with_inst_a().snapshot()).unwrap();
        json["events"][0]["at"] = serde_json::json!("2023-06-15T08:00:00.5+08:00");
        assert!(serde_json::from_value::<RegistrySnapshot>(json).is_err());
    }

    #[test]
    fn test_snapshot_rejects_bad_version() {
        let mut snapshot = registry_with_inst_a().snapshot();
        snapshot.format_version = 99;
        assert!(matches!(
            Registry::from_snapshot(snapshot),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_snapshot_rejects_event_gap() {
        let registry = registry_with_inst_a();
        registry
            .revoke_institution(&caller("admin"), inst("InstA"))
            .unwrap();
        let mut snapshot = registry.snapshot();
        snapshot.events.remove(0);
        assert!(matches!(
            Registry::from_snapshot(snapshot),
            Err(SnapshotError::EventGap)
        ));
    }

    #[test]
    fn test_snapshot_rejects_unknown_issuer() {
        let registry = registry_with_inst_a();
        registry
            .issue_certificate(&caller("InstA"), request("John Doe"))
            .unwrap();
        let mut snapshot = registry.snapshot();
        snapshot.certificates[0].issuer = inst("Forged");
        assert!(matches!(
            Registry::from_snapshot(snapshot),
            Err(SnapshotError::UnknownIssuer { .. })
        ));
    }

    #[test]
    fn test_concurrent_issuance_is_serialized() {
        let registry = std::sync::Arc::new(registry_with_inst_a());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = std::sync::Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| {
                            registry
                                .issue_certificate(&caller("InstA"), request("John Doe"))
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(ids.insert(id), "duplicate certificate id {id}");
            }
        }
        assert_eq!(ids.len(), 200);
        let events = registry.events();
        assert_eq!(events.len(), 201);
        assert!(events
            .iter()
            .enumerate()
            .all(|(i, r)| r.sequence == i as u64 + 1));
    }
}
