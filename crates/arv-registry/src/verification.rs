//! # Verification Engine
//!
//! Stateless. Joins a certificate's stored revocation flag with a live
//! lookup of its issuer's authorization:
//!
//! ```text
//! is_valid = !certificate.is_revoked && institutions[certificate.issuer].authorized
//! ```
//!
//! Nothing is cached and nothing is written back to the certificate. When
//! the administrator revokes an institution, every certificate it ever
//! issued verifies as invalid from that moment, at O(1) cost per check.

use serde::{Deserialize, Serialize};

use arv_core::{CertificateId, InstitutionId, RegistryError};

use crate::certificate::CertificateRegistry;
use crate::institution::InstitutionRegistry;

/// The outcome of verifying a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// The verified certificate.
    pub certificate: CertificateId,
    /// `!is_revoked && issuer_authorized`, computed now.
    pub is_valid: bool,
    /// The issuer recorded on the certificate.
    pub institution: InstitutionId,
    /// The institution name snapshotted at issuance (not the live name).
    pub institution_name: String,
    /// The certificate's own revocation flag.
    pub is_revoked: bool,
    /// Whether the issuer is authorized right now.
    pub issuer_authorized: bool,
}

impl Verification {
    /// A short explanation of the verdict.
    pub fn summary(&self) -> &'static str {
        match (self.is_revoked, self.issuer_authorized) {
            (false, true) => "valid",
            (true, _) => "certificate revoked",
            (false, false) => "issuing institution no longer authorized",
        }
    }
}

/// Verify `id` against the current state of both registries.
pub fn verify(
    certificates: &CertificateRegistry,
    institutions: &InstitutionRegistry,
    id: &CertificateId,
) -> Result<Verification, RegistryError> {
    let certificate = certificates.get(id)?;
    let issuer_authorized = institutions.is_authorized(&certificate.issuer);
    Ok(Verification {
        certificate: certificate.id,
        is_valid: !certificate.is_revoked && issuer_authorized,
        institution: certificate.issuer.clone(),
        institution_name: certificate.institution_name.clone(),
        is_revoked: certificate.is_revoked,
        issuer_authorized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::IssueRequest;
    use arv_core::CallerIdentity;

    fn caller(id: &str) -> CallerIdentity {
        CallerIdentity::new(id).unwrap()
    }

    fn request() -> IssueRequest {
        IssueRequest {
            student_name: "Jane Smith".to_string(),
            student_id: "S789012".to_string(),
            degree: "Master of Business Administration".to_string(),
            major: "Finance".to_string(),
            issue_date: "2023-05-20".to_string(),
            graduation_date: "2023-06-01".to_string(),
            grade: 390,
        }
    }

    #[test]
    fn test_verdict_truth_table() {
        let admin = caller("admin");
        let inst = caller("InstB");
        let mut institutions = InstitutionRegistry::new(admin.clone());
        let mut certs = CertificateRegistry::new();
        institutions
            .authorize(&admin, inst.institution(), "City University")
            .unwrap();
        let (cert, _) = certs.issue(&inst, request(), &institutions).unwrap();

        // Not revoked, authorized.
        let v = verify(&certs, &institutions, &cert.id).unwrap();
        assert!(v.is_valid);
        assert_eq!(v.summary(), "valid");
        assert_eq!(v.institution, inst.institution());
        assert_eq!(v.institution_name, "City University");

        // Not revoked, issuer deauthorized.
        institutions.revoke(&admin, inst.institution()).unwrap();
        let v = verify(&certs, &institutions, &cert.id).unwrap();
        assert!(!v.is_valid);
        assert!(!v.is_revoked);
        assert_eq!(v.summary(), "issuing institution no longer authorized");

        // Reauthorized: valid again without touching the certificate.
        institutions
            .authorize(&admin, inst.institution(), "CityU")
            .unwrap();
        let v = verify(&certs, &institutions, &cert.id).unwrap();
        assert!(v.is_valid);
        assert_eq!(v.institution_name, "City University");

        // Revoked, authorized.
        certs.revoke(&inst, &cert.id, "valid now", &institutions).unwrap();
        let v = verify(&certs, &institutions, &cert.id).unwrap();
        assert!(!v.is_valid);
        assert_eq!(v.summary(), "certificate revoked");

        // Revoked, deauthorized.
        institutions.revoke(&admin, inst.institution()).unwrap();
        let v = verify(&certs, &institutions, &cert.id).unwrap();
        assert!(!v.is_valid);
        assert_eq!(v.summary(), "certificate revoked");
    }

    #[test]
    fn test_unknown_certificate_not_found() {
        let institutions = InstitutionRegistry::new(caller("admin"));
        let certs = CertificateRegistry::new();
        let err = verify(&certs, &institutions, &CertificateId::from_bytes([1; 32])).unwrap_err();
        assert!(err.is_not_found());
    }
}
