//! # Access Control Guards
//!
//! Every mutating registry operation passes through exactly one of the
//! three guards below before it touches state. Read operations pass
//! through none.
//!
//! | Guard                            | Gates                          | Rejection                    |
//! |----------------------------------|--------------------------------|------------------------------|
//! | [`require_administrator`]        | authorize / revoke institution | `NotAdministrator`           |
//! | [`require_authorized_institution`] | issue certificate            | `InstitutionNotAuthorized`   |
//! | [`require_issuer`]               | revoke certificate             | `NotIssuer`                  |
//!
//! The guards check identity and role only. Caller authentication has
//! already happened in the hosting environment.

use arv_core::{AccessDenied, CallerIdentity, InstitutionId};

use crate::certificate::Certificate;
use crate::institution::{Institution, InstitutionRegistry};

/// The caller must be the registry administrator.
pub fn require_administrator(
    caller: &CallerIdentity,
    administrator: &CallerIdentity,
) -> Result<(), AccessDenied> {
    if caller == administrator {
        Ok(())
    } else {
        Err(AccessDenied::NotAdministrator)
    }
}

/// The caller must be an institution that is authorized right now.
///
/// Returns the caller's institution key and current record so the issuer
/// can snapshot the name it is authorized under.
pub fn require_authorized_institution<'a>(
    caller: &CallerIdentity,
    institutions: &'a InstitutionRegistry,
) -> Result<(InstitutionId, &'a Institution), AccessDenied> {
    let id = caller.institution();
    match institutions.get(&id) {
        Some(record) if record.authorized => Ok((id, record)),
        _ => Err(AccessDenied::InstitutionNotAuthorized),
    }
}

/// The caller must be the certificate's recorded issuer.
pub fn require_issuer(caller: &CallerIdentity, certificate: &Certificate) -> Result<(), AccessDenied> {
    if caller.is(&certificate.issuer) {
        Ok(())
    } else {
        Err(AccessDenied::NotIssuer)
    }
}
