//! # Institution Registry
//!
//! Owns the mapping from institution identity to `(name, authorized)` and
//! the singleton administrator identity that controls it.
//!
//! ## Lifecycle
//!
//! ```text
//!   (unknown) ──authorize──▶ Authorized ◀──authorize── (rename in place)
//!                               │   ▲
//!                        revoke │   │ authorize
//!                               ▼   │
//!                           Unauthorized
//! ```
//!
//! Records are created implicitly on first authorization and never
//! deleted. Re-authorization overwrites the name. Revocation clears the
//! flag and leaves the name alone. Neither touches any certificate the
//! institution issued; validity is recomputed at verification time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use arv_core::{CallerIdentity, InstitutionId, RegistryError, Timestamp};

use crate::access::require_administrator;
use crate::events::RegistryEvent;

/// The stored record for an institution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    /// Display name, overwritten on each authorization.
    pub name: String,
    /// Whether the institution may currently issue and revoke.
    pub authorized: bool,
    /// Last authorization change. `None` for the zero-value record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// Administrator-controlled institution authorization store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionRegistry {
    administrator: CallerIdentity,
    institutions: BTreeMap<InstitutionId, Institution>,
}

impl InstitutionRegistry {
    /// An empty registry administered by `administrator`.
    pub fn new(administrator: CallerIdentity) -> Self {
        Self {
            administrator,
            institutions: BTreeMap::new(),
        }
    }

    /// The administrator identity fixed at creation.
    pub fn administrator(&self) -> &CallerIdentity {
        &self.administrator
    }

    /// Authorize `institution` under `name`. Administrator only.
    ///
    /// Idempotent: re-authorizing an authorized institution succeeds and
    /// replaces its name.
    pub fn authorize(
        &mut self,
        caller: &CallerIdentity,
        institution: InstitutionId,
        name: &str,
    ) -> Result<RegistryEvent, RegistryError> {
        require_administrator(caller, &self.administrator)?;
        self.set_authorized(institution.clone(), name);
        Ok(RegistryEvent::InstitutionAuthorized {
            institution,
            name: name.to_string(),
        })
    }

    /// Clear `institution`'s authorization. Administrator only.
    ///
    /// Safe on an institution that is already unauthorized or unknown. An
    /// unknown identity is not recorded.
    pub fn revoke(
        &mut self,
        caller: &CallerIdentity,
        institution: InstitutionId,
    ) -> Result<RegistryEvent, RegistryError> {
        require_administrator(caller, &self.administrator)?;
        self.set_unauthorized(&institution);
        Ok(RegistryEvent::InstitutionRevoked { institution })
    }

    /// Current record for `institution`.
    ///
    /// Never fails: an identity that was never authorized yields the
    /// zero-value record (empty name, unauthorized).
    pub fn query(&self, institution: &InstitutionId) -> Institution {
        self.institutions.get(institution).cloned().unwrap_or_default()
    }

    /// Whether `institution` is authorized right now.
    pub fn is_authorized(&self, institution: &InstitutionId) -> bool {
        self.institutions
            .get(institution)
            .is_some_and(|record| record.authorized)
    }

    /// The stored record, if the institution has ever been touched.
    pub fn get(&self, institution: &InstitutionId) -> Option<&Institution> {
        self.institutions.get(institution)
    }

    /// All known institutions, ordered by identity.
    pub fn iter(&self) -> impl Iterator<Item = (&InstitutionId, &Institution)> {
        self.institutions.iter()
    }

    /// Number of known institutions.
    pub fn len(&self) -> usize {
        self.institutions.len()
    }

    /// Whether no institution has ever been authorized.
    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }

    pub(crate) fn set_authorized(&mut self, institution: InstitutionId, name: &str) {
        let record = self.institutions.entry(institution).or_default();
        record.name = name.to_string();
        record.authorized = true;
        record.updated_at = Some(Timestamp::now());
    }

    /// Clears the flag on an existing record. Unknown ids stay absent.
    pub(crate) fn set_unauthorized(&mut self, institution: &InstitutionId) {
        if let Some(record) = self.institutions.get_mut(institution) {
            record.authorized = false;
            record.updated_at = Some(Timestamp::now());
        }
    }
}
