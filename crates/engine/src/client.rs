//! Collaborator interfaces to the external marketplace APIs.
//!
//! The engine never touches wire bytes, signing or envelope decoding; it
//! sees these shapes only. Every call is one remote round trip for one
//! tenant; no operation spans tenants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use marketfeed_feeds::FeedPayload;
use marketfeed_inventory::TenantCredentials;

/// Transient transport-level failure (connection, 5xx, malformed response).
///
/// Not retried internally; the caller's scheduler owns retry policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Failure modes of a submission call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The external system rejected the call for rate reasons. Handled like
    /// a gate-level throttle: an expected per-tenant outcome, not a fault.
    #[error("submission throttled by the external system")]
    Throttled,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Acknowledgement of one accepted submission.
#[derive(Debug, Clone)]
pub struct JobHandle {
    /// Job id assigned by the external system.
    pub external_job_id: String,
    /// Submission timestamp from the acknowledgement envelope.
    pub submitted_at: DateTime<Utc>,
    /// The parsed acknowledgement, kept for logging/auditing.
    pub raw_envelope: serde_json::Value,
}

/// One entry of the external status listing.
#[derive(Debug, Clone)]
pub struct JobStatusUpdate {
    pub external_job_id: String,
    /// Raw processing-status code (e.g. `_IN_PROGRESS_`, `_DONE_`).
    pub status_code: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Parsed processing summary of a fetched result document.
#[derive(Debug, Clone)]
pub struct ResultSummary {
    /// Top-level status code, `"Complete"` on the happy path.
    pub status_code: String,
    /// Document transaction id, used in user-facing summaries.
    pub transaction_id: String,
    pub messages_processed: u64,
    pub errors: u64,
    pub warnings: u64,
}

/// A fetched result document for one finished job.
#[derive(Debug, Clone)]
pub struct FeedResult {
    pub body: Vec<u8>,
    /// Provider-supplied Content-MD5 header for integrity verification.
    pub checksum_header: String,
    pub summary: ResultSummary,
}

/// External feed submission API.
#[async_trait]
pub trait FeedSubmissionApi: Send + Sync {
    async fn submit(
        &self,
        credentials: &TenantCredentials,
        payload: &FeedPayload,
    ) -> Result<JobHandle, SubmitError>;
}

/// External feed status/result query API.
#[async_trait]
pub trait FeedQueryApi: Send + Sync {
    async fn list_statuses(
        &self,
        credentials: &TenantCredentials,
        external_job_ids: &[String],
    ) -> Result<Vec<JobStatusUpdate>, TransportError>;

    async fn fetch_result(
        &self,
        credentials: &TenantCredentials,
        external_job_id: &str,
    ) -> Result<FeedResult, TransportError>;
}
