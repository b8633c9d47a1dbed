//! Feed submission and reconciliation engine.
//!
//! ## Design
//!
//! - Pending inventory changes are grouped per tenant and submitted as
//!   asynchronous jobs to the external marketplace
//! - A throttle gate bounds how often one tenant may submit; one tenant's
//!   throttling never blocks another's submission
//! - Terminal job outcomes are reconciled back onto the originating records
//!   by a poller, including checksum verification of result documents
//! - Expected outcomes (throttling, data corruption) are values in reports;
//!   transport failures propagate so the caller's scheduler owns retries
//!
//! ## Components
//!
//! - [`batch`]: partitions an unordered record set into per-tenant groups
//! - [`throttle`]: the per-tenant minimum-interval gate
//! - [`client`]: collaborator traits for the external submission/query APIs
//! - [`orchestrator`]: drives grouping → gate → payloads → submission
//! - [`reconcile`]: polls outstanding jobs and applies terminal transitions
//! - [`integrity`]: Content-MD5 verification of fetched result documents

pub mod batch;
pub mod client;
pub mod integrity;
pub mod orchestrator;
pub mod reconcile;
pub mod throttle;

pub use batch::{TenantBatch, group_by_tenant};
pub use client::{
    FeedQueryApi, FeedResult, FeedSubmissionApi, JobHandle, JobStatusUpdate, ResultSummary,
    SubmitError, TransportError,
};
pub use orchestrator::{
    CancelFlag, SyncError, SyncOrchestrator, SyncReport, TenantFailed, TenantSuccess,
    TenantThrottled,
};
pub use reconcile::{ReconciliationPoller, StatusReport};
pub use throttle::{ThrottleDecision, ThrottlePolicy};
