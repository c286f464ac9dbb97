//! # arv-registry: Academic Record Registry
//!
//! An administrator authorizes institutions. Authorized institutions issue
//! immutable certificates and may later revoke the ones they issued. Anyone
//! may verify a certificate; validity is computed live from the
//! certificate's own revocation flag and its issuer's current authorization.
//!
//! ## Modules
//!
//! - **Institution Registry** (`institution.rs`): administrator-gated
//!   `(name, authorized)` records, created on first authorization and never
//!   deleted.
//!
//! - **Certificate Registry** (`certificate.rs`): issuance, one-way
//!   revocation, and collision-free identifier allocation.
//!
//! - **Access Control** (`access.rs`): the three guards every mutation
//!   passes through.
//!
//! - **Verification Engine** (`verification.rs`): the stateless validity
//!   join.
//!
//! - **Events** (`events.rs`): append-only, sequence-numbered history with
//!   a live broadcast feed.
//!
//! - **Registry** (`registry.rs`): the facade holding all of the above
//!   behind a single lock, plus snapshot persistence.
//!
//! ## Design
//!
//! Caller identity is an explicit parameter on every operation. Nothing is
//! read from ambient context, so the stores can be driven from tests, the
//! CLI, or any host that authenticates callers its own way.

pub mod access;
pub mod certificate;
pub mod events;
pub mod institution;
pub mod registry;
pub mod verification;

// ─── Store re-exports ───────────────────────────────────────────────

pub use certificate::{derive_certificate_id, Certificate, CertificateRegistry, IssueRequest};
pub use institution::{Institution, InstitutionRegistry};

// ─── Facade re-exports ──────────────────────────────────────────────

pub use events::{EventLog, EventRecord, RegistryEvent, EVENT_CHANNEL_CAPACITY};
pub use registry::{Registry, RegistrySnapshot, SnapshotError, SNAPSHOT_FORMAT_VERSION};
pub use verification::{verify, Verification};
