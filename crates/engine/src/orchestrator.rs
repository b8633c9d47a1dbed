//! Submission orchestration: grouping → throttle gate → payloads → jobs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use marketfeed_core::{FeedJobId, RecordId, TenantId};
use marketfeed_feeds::{FeedError, FeedJob, FeedOperation, build_feeds};
use marketfeed_infra::{RecordStore, StoreError};
use marketfeed_inventory::SyncStatus;

use crate::batch::{TenantBatch, group_by_tenant};
use crate::client::{FeedSubmissionApi, SubmitError, TransportError};
use crate::throttle::{ThrottleDecision, ThrottlePolicy};

/// Failures that abort a whole sync run.
///
/// Per-tenant outcomes (throttling, bad payload input) are reported in
/// [`SyncReport`] instead; they never abort other tenants.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Propagated as-is: the caller's scheduler owns retry policy.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A tenant whose batch was fully submitted.
#[derive(Debug, Clone, Serialize)]
pub struct TenantSuccess {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub job_ids: Vec<FeedJobId>,
    pub records: usize,
}

/// A tenant rejected by the gate or by the external system's rate limit.
#[derive(Debug, Clone, Serialize)]
pub struct TenantThrottled {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub minutes_remaining: i64,
}

impl std::fmt::Display for TenantThrottled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Throttling: {} - {} minute(s) remaining",
            self.tenant_name, self.minutes_remaining
        )
    }
}

/// A tenant whose payloads could not be built; nothing was submitted for it.
#[derive(Debug, Clone, Serialize)]
pub struct TenantFailed {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    #[serde(serialize_with = "serialize_feed_error")]
    pub error: FeedError,
}

fn serialize_feed_error<S: serde::Serializer>(e: &FeedError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&e.to_string())
}

/// Per-tenant outcome list of one sync run. No tenant's result is ever
/// merged into or hidden behind another's.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub successes: Vec<TenantSuccess>,
    pub throttled: Vec<TenantThrottled>,
    pub failed: Vec<TenantFailed>,
    /// Tenants abandoned after a cancellation signal, in grouping order.
    pub skipped: Vec<TenantId>,
}

/// Cooperative cancellation signal, checked between tenant batches.
/// Already-committed tenants are never rolled back.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives one sync run end to end. Each tenant batch is the atomicity
/// boundary: a tenant gets its job records, status flips and timestamp
/// update, or none of them (individual payload submissions being separate
/// remote calls, each successful one persists its job immediately).
pub struct SyncOrchestrator {
    store: Arc<dyn RecordStore>,
    client: Arc<dyn FeedSubmissionApi>,
    policy: ThrottlePolicy,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>, client: Arc<dyn FeedSubmissionApi>) -> Self {
        Self {
            store,
            client,
            policy: ThrottlePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ThrottlePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Submit every pending record, grouped per tenant.
    ///
    /// Throttled tenants and payload-build failures are collected in the
    /// report and never block other tenants. Transport failures propagate.
    pub async fn sync_batch(
        &self,
        records: Vec<marketfeed_inventory::InventoryRecord>,
        operation: FeedOperation,
        cancel: &CancelFlag,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        let mut batches = group_by_tenant(records).into_iter();

        while let Some(batch) = batches.next() {
            if cancel.is_cancelled() {
                info!(tenant_id = %batch.tenant_id, "sync cancelled, abandoning remaining tenants");
                report.skipped.push(batch.tenant_id);
                report.skipped.extend(batches.map(|b| b.tenant_id));
                break;
            }
            self.sync_tenant(batch, operation, &mut report).await?;
        }

        Ok(report)
    }

    /// Hand a claimed throttle slot back after a submission attempt that
    /// produced no jobs. A conflict means another run advanced the slot in
    /// the meantime; that run's claim stands.
    fn release_claim(
        &self,
        tenant_id: TenantId,
        claimed_at: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) {
        if let Err(error) =
            self.store
                .compare_and_set_last_execution(tenant_id, Some(claimed_at), previous)
        {
            warn!(%tenant_id, %error, "throttle slot restore lost to a concurrent run");
        }
    }

    async fn sync_tenant(
        &self,
        batch: TenantBatch,
        operation: FeedOperation,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let tenant = self.store.tenant(batch.tenant_id)?;
        let now = Utc::now();

        if let ThrottleDecision::Throttled { minutes_remaining } =
            self.policy.allow(tenant.last_execution, now)
        {
            let outcome = TenantThrottled {
                tenant_id: tenant.id,
                tenant_name: tenant.name,
                minutes_remaining,
            };
            warn!(%outcome, "submission gated");
            report.throttled.push(outcome);
            return Ok(());
        }

        // Payloads are built before the throttle slot is claimed: a bad
        // condition value must not burn the tenant's interval.
        let payloads = match build_feeds(operation, &tenant.credentials.seller_id, &batch.records) {
            Ok(payloads) => payloads,
            Err(error) => {
                error!(tenant_id = %tenant.id, %error, "payload build failed, batch not submitted");
                report.failed.push(TenantFailed {
                    tenant_id: tenant.id,
                    tenant_name: tenant.name,
                    error,
                });
                return Ok(());
            }
        };

        // Claim the throttle slot with a conditional update. A conflict
        // means a concurrent run already claimed it off the same snapshot.
        match self
            .store
            .compare_and_set_last_execution(tenant.id, tenant.last_execution, Some(now))
        {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                let fresh = self.store.tenant(tenant.id)?;
                let minutes_remaining = match self.policy.allow(fresh.last_execution, now) {
                    ThrottleDecision::Throttled { minutes_remaining } => minutes_remaining,
                    ThrottleDecision::Allowed => 0,
                };
                let outcome = TenantThrottled {
                    tenant_id: tenant.id,
                    tenant_name: tenant.name,
                    minutes_remaining,
                };
                warn!(%outcome, "lost submission race to a concurrent run");
                report.throttled.push(outcome);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let record_ids: Vec<RecordId> = batch.records.iter().map(|r| r.id).collect();
        let mut job_ids: Vec<FeedJobId> = Vec::new();

        // Fixed submission order (product → price → inventory): the external
        // system does not guarantee ordering, and log correlation assumes it.
        for payload in &payloads {
            match self.client.submit(&tenant.credentials, payload).await {
                Ok(handle) => {
                    debug!(tenant_id = %tenant.id, envelope = %handle.raw_envelope, "submission acknowledged");
                    let job = FeedJob::submitted(
                        tenant.id,
                        payload.kind,
                        handle.external_job_id,
                        handle.submitted_at,
                    );
                    info!(
                        tenant_id = %tenant.id,
                        job_id = %job.id,
                        external_id = %job.external_id,
                        kind = ?payload.kind,
                        "feed job created"
                    );
                    job_ids.push(job.id);
                    self.store.insert_job(job, &record_ids)?;
                }
                Err(SubmitError::Throttled) => {
                    if job_ids.is_empty() {
                        // Nothing went out; hand the claimed slot back so the
                        // tenant is not penalized for the remote rejection.
                        self.release_claim(tenant.id, now, tenant.last_execution);
                    }
                    let outcome = TenantThrottled {
                        tenant_id: tenant.id,
                        tenant_name: tenant.name,
                        minutes_remaining: self.policy.reporting_window.num_minutes(),
                    };
                    warn!(%outcome, submitted = job_ids.len(), "throttled by the external system mid-batch");
                    report.throttled.push(outcome);
                    return Ok(());
                }
                Err(SubmitError::Transport(e)) => {
                    if job_ids.is_empty() {
                        // Nothing went out; the caller's retry must not find
                        // the gate closed for the full interval.
                        self.release_claim(tenant.id, now, tenant.last_execution);
                    }
                    error!(tenant_id = %tenant.id, error = %e, "submission transport failure");
                    return Err(SyncError::Transport(e));
                }
            }
        }

        self.store.set_sync_status(&record_ids, SyncStatus::AwaitingCheck)?;
        info!(
            tenant_id = %tenant.id,
            jobs = job_ids.len(),
            records = record_ids.len(),
            "tenant batch submitted"
        );
        report.successes.push(TenantSuccess {
            tenant_id: tenant.id,
            tenant_name: tenant.name,
            job_ids,
            records: record_ids.len(),
        });
        Ok(())
    }
}
