//! Reconciliation of outstanding submission jobs.
//!
//! Polls the external system for the jobs still in `Submitted`/`InProgress`,
//! applies terminal transitions, verifies result-document integrity, and
//! flips records to `Synced` once their latest submission cycle completed
//! cleanly. Calling it again with no new external state is a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use marketfeed_core::{FeedJobId, TenantId};
use marketfeed_feeds::{FeedJob, ProcessingStatus, classify_result};
use marketfeed_infra::RecordStore;
use marketfeed_inventory::SyncStatus;

use crate::client::FeedQueryApi;
use crate::integrity::verify_checksum;
use crate::orchestrator::SyncError;

/// User-facing summary of one reconciliation pass. The caller (UI layer)
/// aggregates per-status counts; the engine reports raw id lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// External ids of every job whose status was refreshed.
    pub checked: Vec<String>,
    /// Jobs whose result carried errors or warnings. Corruption is included,
    /// since a corrupted result can never be treated as success.
    pub ended_with_error: Vec<String>,
    /// Jobs whose result document reported a non-"Complete" status.
    pub did_not_complete: Vec<String>,
    /// Jobs whose result document failed checksum verification.
    pub corrupted: Vec<String>,
}

/// Polls and applies terminal job outcomes for one tenant at a time.
pub struct ReconciliationPoller {
    store: Arc<dyn RecordStore>,
    client: Arc<dyn FeedQueryApi>,
}

impl ReconciliationPoller {
    pub fn new(store: Arc<dyn RecordStore>, client: Arc<dyn FeedQueryApi>) -> Self {
        Self { store, client }
    }

    /// Refresh every outstanding job of `tenant_id`.
    pub async fn check_status(&self, tenant_id: TenantId) -> Result<StatusReport, SyncError> {
        let tenant = self.store.tenant(tenant_id)?;
        let jobs = self.store.outstanding_jobs(tenant_id)?;
        if jobs.is_empty() {
            return Ok(StatusReport::default());
        }

        let external_ids: Vec<String> = jobs.iter().map(|j| j.external_id.clone()).collect();
        let updates = self
            .client
            .list_statuses(&tenant.credentials, &external_ids)
            .await?;

        let mut by_external: HashMap<String, FeedJob> =
            jobs.into_iter().map(|j| (j.external_id.clone(), j)).collect();

        let mut report = StatusReport::default();
        for update in updates {
            let Some(mut job) = by_external.remove(&update.external_job_id) else {
                warn!(external_id = %update.external_job_id, "status for a job we did not ask about");
                continue;
            };

            job.status = ProcessingStatus::from_external(&update.status_code);
            if update.started_at.is_some() {
                job.started_at = update.started_at;
            }
            if update.completed_at.is_some() {
                job.completed_at = update.completed_at;
            }

            if job.status == ProcessingStatus::Done {
                self.resolve_result(&tenant, &mut job, &mut report).await?;
            }

            info!(
                tenant_id = %tenant_id,
                external_id = %job.external_id,
                status = ?job.status,
                "job status reconciled"
            );
            report.checked.push(job.external_id.clone());
            let clean = job.status == ProcessingStatus::Done;
            let job_id = job.id;
            self.store.update_job(&job)?;
            if clean {
                self.mark_records_synced(job_id)?;
            }
        }

        Ok(report)
    }

    /// Fetch and interpret the result document of a job that reached the
    /// terminal success code.
    async fn resolve_result(
        &self,
        tenant: &marketfeed_inventory::Tenant,
        job: &mut FeedJob,
        report: &mut StatusReport,
    ) -> Result<(), SyncError> {
        let result = self
            .client
            .fetch_result(&tenant.credentials, &job.external_id)
            .await?;

        if !verify_checksum(&result.body, &result.checksum_header) {
            error!(
                external_id = %job.external_id,
                header = %result.checksum_header,
                "DATA CORRUPTION: result body does not match checksum header"
            );
            job.status = ProcessingStatus::DataCorruption;
            report.corrupted.push(job.external_id.clone());
            report.ended_with_error.push(job.external_id.clone());
            return Ok(());
        }

        let summary = &result.summary;
        if summary.status_code != "Complete" {
            report.did_not_complete.push(summary.transaction_id.clone());
        }
        if summary.errors > 0 || summary.warnings > 0 {
            warn!(
                external_id = %job.external_id,
                errors = summary.errors,
                warnings = summary.warnings,
                "result completed with problems"
            );
            report.ended_with_error.push(summary.transaction_id.clone());
        }
        job.status = classify_result(&summary.status_code, summary.errors, summary.warnings);
        Ok(())
    }

    /// Flip records of a cleanly-done job to `Synced`, but only those whose
    /// entire latest submission cycle (all jobs sharing the most recent
    /// `submitted_at`) ended clean.
    fn mark_records_synced(&self, job_id: FeedJobId) -> Result<(), SyncError> {
        let mut ready = Vec::new();
        for record_id in self.store.records_for_job(job_id)? {
            let record = self.store.record(record_id)?;
            if record.sync_status != SyncStatus::AwaitingCheck {
                continue;
            }
            let jobs = self.store.jobs_for_record(record_id)?;
            let Some(latest) = jobs.iter().map(|j| j.submitted_at).max() else {
                continue;
            };
            let cycle_clean = jobs
                .iter()
                .filter(|j| j.submitted_at == latest)
                .all(|j| j.status == ProcessingStatus::Done);
            if cycle_clean {
                ready.push(record_id);
            }
        }
        if !ready.is_empty() {
            info!(job_id = %job_id, records = ready.len(), "records confirmed synced");
            self.store.set_sync_status(&ready, SyncStatus::Synced)?;
        }
        Ok(())
    }
}
