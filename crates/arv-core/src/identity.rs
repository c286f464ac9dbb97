//! # Identifier Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the registry.
//! These prevent accidental identifier confusion: you cannot pass a
//! `CertificateId` where an `InstitutionId` is expected.
//!
//! ## Caller identity
//!
//! The hosting environment authenticates callers. The registry receives the
//! resulting principal as a [`CallerIdentity`] and trusts it without further
//! verification; it only performs authorization checks against it. An
//! institution acts as itself, so its [`InstitutionId`] is derived from the
//! caller identity it authenticates with.

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::CoreError;

/// An authenticated principal supplied by the hosting environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallerIdentity(String);

/// Registry key of an institution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstitutionId(String);

/// Registry-assigned certificate identifier (32 bytes, rendered as `0x` hex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateId([u8; 32]);

fn validated_principal(raw: &str, what: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

impl CallerIdentity {
    /// Wrap an authenticated principal. Rejects empty identities.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        validated_principal(raw.as_ref(), "caller identity").map(Self)
    }

    /// The principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The institution this caller acts as.
    pub fn institution(&self) -> InstitutionId {
        InstitutionId(self.0.clone())
    }

    /// Whether this caller is the given institution.
    pub fn is(&self, institution: &InstitutionId) -> bool {
        self.0 == institution.0
    }
}

impl InstitutionId {
    /// Wrap an institution identity. Rejects empty identities.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        validated_principal(raw.as_ref(), "institution identity").map(Self)
    }

    /// The identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CertificateId {
    /// Construct from raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Construct from a content digest.
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self(digest.bytes)
    }

    /// The raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from 64 hex digits, with or without a `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if hex.len() != 64 {
            return Err(CoreError::Validation(format!(
                "certificate id must be 64 hex digits, got {}",
                hex.len()
            )));
        }
        // from_str_radix tolerates a leading '+', so check digits up front.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::Validation(format!("invalid certificate id: {s:?}")));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| CoreError::Validation(format!("invalid certificate id: {s:?}")))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| CoreError::Validation(format!("invalid certificate id: {s:?}")))?;
        }
        Ok(Self(bytes))
    }

    /// Lowercase hex with `0x` prefix.
    pub fn to_hex(&self) -> String {
        let digits: String = self.0.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{digits}")
    }
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for CallerIdentity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::str::FromStr for InstitutionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::str::FromStr for CertificateId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CallerIdentity {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for InstitutionId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for CertificateId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CallerIdentity> for String {
    fn from(id: CallerIdentity) -> Self {
        id.0
    }
}

impl From<InstitutionId> for String {
    fn from(id: InstitutionId) -> Self {
        id.0
    }
}

impl From<CertificateId> for String {
    fn from(id: CertificateId) -> Self {
        id.to_hex()
    }
}
