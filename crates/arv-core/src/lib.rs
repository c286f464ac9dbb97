//! # arv-core: Foundational Types for the Academic Record Registry
//!
//! This crate is the leaf of the workspace. It defines the identifiers,
//! error taxonomy, and hashing primitives that the registry crate and the
//! command-line driver build on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `CallerIdentity`, `InstitutionId`
//!    and `CertificateId` are distinct types. You cannot pass a caller where a
//!    certificate identifier is expected.
//!
//! 2. **Three-way error taxonomy.** Every registry operation fails with
//!    exactly one of `Authorization`, `NotFound` or `State`, each with a
//!    distinct human-readable reason.
//!
//! 3. **Field-framed digests.** Certificate identifiers are SHA-256 digests
//!    over length-prefixed fields, built with `FieldDigest`.
//!
//! 4. **UTC-only timestamps.** Bookkeeping timestamps are UTC with `Z`
//!    suffix and seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `arv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use digest::{ContentDigest, FieldDigest};
pub use error::{AccessDenied, CoreError, NotFound, RegistryError, StateViolation};
pub use identity::{CallerIdentity, CertificateId, InstitutionId};
pub use temporal::Timestamp;
