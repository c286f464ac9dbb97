//! # Registry Events
//!
//! Every committed mutation appends exactly one [`RegistryEvent`] to the
//! [`EventLog`]. Rejected operations append nothing. Collaborators recover
//! generated certificate identifiers and display outcomes from these
//! records; the events carry no logic of their own.
//!
//! The log is append-only and numbered from 1 with no gaps. Live consumers
//! subscribe through a `tokio::sync::broadcast` channel; publishing never
//! blocks the mutating call. A subscriber that lags past the channel
//! capacity resynchronizes with [`EventLog::since()`].

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use arv_core::{CertificateId, InstitutionId, Timestamp};

/// Broadcast buffer per subscriber before it starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// A structured notification of a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    /// The administrator authorized (or re-authorized) an institution.
    InstitutionAuthorized {
        /// The institution.
        institution: InstitutionId,
        /// The name it was authorized under.
        name: String,
    },
    /// The administrator revoked an institution's authorization.
    InstitutionRevoked {
        /// The institution.
        institution: InstitutionId,
    },
    /// An authorized institution issued a certificate.
    CertificateIssued {
        certificate: CertificateId,
        issuer: InstitutionId,
        institution_name: String,
        student_name: String,
        student_id: String,
        degree: String,
        major: String,
        issue_date: String,
        graduation_date: String,
        grade: u64,
    },
    /// The issuing institution revoked a certificate.
    CertificateRevoked {
        /// The certificate.
        certificate: CertificateId,
        /// Its issuer.
        issuer: InstitutionId,
        /// The recorded reason.
        reason: String,
    },
}

impl RegistryEvent {
    /// The event's type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InstitutionAuthorized { .. } => "InstitutionAuthorized",
            Self::InstitutionRevoked { .. } => "InstitutionRevoked",
            Self::CertificateIssued { .. } => "CertificateIssued",
            Self::CertificateRevoked { .. } => "CertificateRevoked",
        }
    }
}

/// A numbered, timestamped entry in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 1.
    pub sequence: u64,
    /// When the mutation committed.
    pub at: Timestamp,
    /// The event.
    #[serde(flatten)]
    pub event: RegistryEvent,
}

/// Append-only event history with live fan-out.
#[derive(Debug)]
pub struct EventLog {
    records: Vec<EventRecord>,
    sender: broadcast::Sender<EventRecord>,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    /// Rebuild a log from persisted history.
    ///
    /// The caller is responsible for the history being gap-free; see
    /// [`EventLog::is_contiguous()`].
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { records, sender }
    }

    /// Append an event and publish it to live subscribers.
    pub(crate) fn append(&mut self, event: RegistryEvent) -> EventRecord {
        let record = EventRecord {
            sequence: self.records.len() as u64 + 1,
            at: Timestamp::now(),
            event,
        };
        self.records.push(record.clone());
        // No receivers is not an error: the history still has the record.
        let _ = self.sender.send(record.clone());
        record
    }

    /// Subscribe to events committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    /// The full history.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with a sequence number strictly greater than `sequence`.
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = usize::try_from(sequence)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether sequence numbers run 1, 2, 3, ... with no gaps.
    pub fn is_contiguous(&self) -> bool {
        self.records
            .iter()
            .enumerate()
            .all(|(i, r)| r.sequence == i as u64 + 1)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
