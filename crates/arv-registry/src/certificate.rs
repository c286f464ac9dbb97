//! # Certificate Registry
//!
//! Owns issued certificate records. A record is immutable after issuance
//! except for a single one-way transition from not-revoked to revoked.
//! Records are never deleted and identifiers are never reused.
//!
//! ## Identifier allocation
//!
//! A certificate identifier is a field-framed SHA-256 digest over
//!
//! ```text
//! ("arv.certificate.v1", sequence, issuer, student_name, student_id,
//!  degree, major, issue_date, graduation_date, grade)
//! ```
//!
//! where `sequence` is a registry-wide counter that advances on every
//! allocation. Two bit-identical issuance requests from the same issuer
//! therefore still receive different identifiers. If a derived identifier
//! is ever already taken, allocation advances the counter and derives
//! again, so a collision is never observable.
//!
//! ## Revocation
//!
//! Only the recorded issuer may revoke, and only while it is currently
//! authorized. An institution that has itself been revoked cannot revoke
//! its earlier certificates until the administrator reauthorizes it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use arv_core::{
    CallerIdentity, CertificateId, FieldDigest, InstitutionId, NotFound, RegistryError,
    StateViolation, Timestamp,
};

use crate::access::{require_authorized_institution, require_issuer};
use crate::events::RegistryEvent;
use crate::institution::InstitutionRegistry;

/// Domain tag for certificate identifier digests.
const CERTIFICATE_ID_DOMAIN: &str = "arv.certificate.v1";

/// The caller-supplied fields of a certificate.
///
/// Dates are opaque strings and the grade is an unscaled integer
/// (385 conventionally meaning 3.85). None of them are validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub student_name: String,
    pub student_id: String,
    pub degree: String,
    pub major: String,
    pub issue_date: String,
    pub graduation_date: String,
    pub grade: u64,
}

/// An issued certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Registry-assigned identifier.
    pub id: CertificateId,
    pub student_name: String,
    pub student_id: String,
    pub degree: String,
    pub major: String,
    pub issue_date: String,
    pub graduation_date: String,
    pub grade: u64,
    /// The institution that issued this certificate.
    pub issuer: InstitutionId,
    /// The issuer's name at issuance time. Never refreshed.
    pub institution_name: String,
    /// One-way revocation flag.
    pub is_revoked: bool,
    /// Reason given by the most recent revocation; empty until revoked.
    pub revocation_reason: String,
    /// When the registry committed the issuance.
    pub recorded_at: Timestamp,
    /// When the certificate was first revoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
}

/// Certificate store with issuer-gated issuance and revocation.
#[derive(Debug, Clone, Default)]
pub struct CertificateRegistry {
    certificates: HashMap<CertificateId, Certificate>,
    issuance_order: Vec<CertificateId>,
    next_sequence: u64,
}

impl CertificateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from records in issuance order.
    ///
    /// Returns `None` if an identifier repeats or `next_sequence` has been
    /// rewound below the number of stored records.
    pub fn from_records(records: Vec<Certificate>, next_sequence: u64) -> Option<Self> {
        if next_sequence < records.len() as u64 {
            return None;
        }
        let mut this = Self {
            certificates: HashMap::with_capacity(records.len()),
            issuance_order: Vec::with_capacity(records.len()),
            next_sequence,
        };
        for record in records {
            let id = record.id;
            if this.certificates.insert(id, record).is_some() {
                return None;
            }
            this.issuance_order.push(id);
        }
        Some(this)
    }

    /// Issue a certificate as `caller`.
    ///
    /// The caller must be an institution authorized at call time. The
    /// stored record snapshots the caller's identity and its current
    /// institution name.
    pub fn issue(
        &mut self,
        caller: &CallerIdentity,
        request: IssueRequest,
        institutions: &InstitutionRegistry,
    ) -> Result<(Certificate, RegistryEvent), RegistryError> {
        let (issuer, institution) = require_authorized_institution(caller, institutions)?;
        let institution_name = institution.name.clone();
        let id = self.allocate_id(&issuer, &request);

        let certificate = Certificate {
            id,
            student_name: request.student_name,
            student_id: request.student_id,
            degree: request.degree,
            major: request.major,
            issue_date: request.issue_date,
            graduation_date: request.graduation_date,
            grade: request.grade,
            issuer,
            institution_name,
            is_revoked: false,
            revocation_reason: String::new(),
            recorded_at: Timestamp::now(),
            revoked_at: None,
        };
        let event = RegistryEvent::CertificateIssued {
            certificate: id,
            issuer: certificate.issuer.clone(),
            institution_name: certificate.institution_name.clone(),
            student_name: certificate.student_name.clone(),
            student_id: certificate.student_id.clone(),
            degree: certificate.degree.clone(),
            major: certificate.major.clone(),
            issue_date: certificate.issue_date.clone(),
            graduation_date: certificate.graduation_date.clone(),
            grade: certificate.grade,
        };

        self.issuance_order.push(id);
        self.certificates.insert(id, certificate.clone());
        Ok((certificate, event))
    }

    /// Revoke `id` as `caller`, recording `reason`.
    ///
    /// Checks, in order: the certificate exists (`NotFound`), the caller is
    /// its issuer (`Authorization`), the issuer is currently authorized
    /// (`State`). Revoking an already revoked certificate replaces the
    /// reason and keeps the original `revoked_at`.
    pub fn revoke(
        &mut self,
        caller: &CallerIdentity,
        id: &CertificateId,
        reason: &str,
        institutions: &InstitutionRegistry,
    ) -> Result<RegistryEvent, RegistryError> {
        let certificate = self
            .certificates
            .get_mut(id)
            .ok_or(NotFound::Certificate(*id))?;
        require_issuer(caller, certificate)?;
        if !institutions.is_authorized(&certificate.issuer) {
            return Err(StateViolation::IssuerNotAuthorized.into());
        }

        certificate.is_revoked = true;
        certificate.revocation_reason = reason.to_string();
        certificate.revoked_at.get_or_insert_with(Timestamp::now);

        Ok(RegistryEvent::CertificateRevoked {
            certificate: *id,
            issuer: certificate.issuer.clone(),
            reason: reason.to_string(),
        })
    }

    /// The stored record for `id`.
    pub fn get(&self, id: &CertificateId) -> Result<&Certificate, RegistryError> {
        self.certificates
            .get(id)
            .ok_or_else(|| NotFound::Certificate(*id).into())
    }

    /// Identifiers issued by `issuer`, in issuance order.
    pub fn issued_by(&self, issuer: &InstitutionId) -> Vec<CertificateId> {
        self.records()
            .filter(|c| &c.issuer == issuer)
            .map(|c| c.id)
            .collect()
    }

    /// All records in issuance order.
    pub fn records(&self) -> impl Iterator<Item = &Certificate> {
        self.issuance_order
            .iter()
            .filter_map(|id| self.certificates.get(id))
    }

    /// The sequence number the next allocation starts from.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Number of issued certificates.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Whether nothing has been issued.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    fn allocate_id(&mut self, issuer: &InstitutionId, request: &IssueRequest) -> CertificateId {
        loop {
            let sequence = self.next_sequence;
            self.next_sequence = self.next_sequence.wrapping_add(1);
            let id = derive_certificate_id(sequence, issuer, request);
            if !self.certificates.contains_key(&id) {
                return id;
            }
            tracing::warn!(certificate = %id, sequence, "certificate id already allocated, advancing sequence");
        }
    }
}

/// Derive the identifier for an issuance at `sequence`.
pub fn derive_certificate_id(
    sequence: u64,
    issuer: &InstitutionId,
    request: &IssueRequest,
) -> CertificateId {
    let mut digest = FieldDigest::new(CERTIFICATE_ID_DOMAIN);
    digest
        .push_u64(sequence)
        .push_str(issuer.as_str())
        .push_str(&request.student_name)
        .push_str(&request.student_id)
        .push_str(&request.degree)
        .push_str(&request.major)
        .push_str(&request.issue_date)
        .push_str(&request.graduation_date)
        .push_u64(request.grade);
    CertificateId::from_digest(&digest.finish())
}
