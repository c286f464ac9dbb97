//! # Error Types: Registry Error Taxonomy
//!
//! Every registry operation that fails does so with a [`RegistryError`],
//! which has exactly three arms:
//!
//! - **Authorization**: the caller lacks the role the operation requires.
//! - **NotFound**: a referenced certificate identifier is unknown.
//! - **State**: the caller has the right role, but current mutable state
//!   forbids the operation (an issuer that is no longer authorized).
//!
//! A failed operation leaves registry state untouched and emits no event.
//!
//! Failures outside the registry taxonomy (identifier and timestamp
//! parsing) use [`CoreError`].

use thiserror::Error;

use crate::identity::CertificateId;

/// The registry error taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Caller lacks the role required for the attempted operation.
    #[error("authorization error: {0}")]
    Authorization(#[from] AccessDenied),

    /// Referenced identifier is unknown.
    #[error("not found: {0}")]
    NotFound(#[from] NotFound),

    /// Caller's role is correct but current state forbids the operation.
    #[error("state error: {0}")]
    State(#[from] StateViolation),
}

impl RegistryError {
    /// Stable machine-readable code for this error's taxonomy arm.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "AUTHORIZATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::State(_) => "STATE",
        }
    }

    /// Whether this is an authorization failure.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    /// Whether this is a not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this is a state failure.
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }
}

/// Reasons an access-control guard rejects a caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// Only the registry administrator may change institution authorization.
    #[error("only the administrator may manage institutions")]
    NotAdministrator,

    /// The caller is not a currently authorized institution.
    #[error("only authorized institutions can issue certificates")]
    InstitutionNotAuthorized,

    /// The caller is not the institution recorded as the certificate's issuer.
    #[error("only the issuing institution may revoke")]
    NotIssuer,
}

/// A referenced record does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    /// No certificate with this identifier has been issued.
    #[error("certificate {0} does not exist")]
    Certificate(CertificateId),
}

/// Operations rejected because of current mutable state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateViolation {
    /// The original issuer has since lost its authorization.
    #[error("issuer must currently be authorized to revoke")]
    IssuerNotAuthorized,
}

/// Errors outside the registry taxonomy.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input failed structural validation (identifier or timestamp syntax).
    #[error("validation error: {0}")]
    Validation(String),
}
