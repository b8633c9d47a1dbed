//! Record store abstraction and the in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use marketfeed_core::{FeedJobId, RecordId, TenantId};
use marketfeed_feeds::FeedJob;
use marketfeed_inventory::{InventoryRecord, SyncStatus, Tenant};

/// Store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("tenant not found: {0}")]
    TenantNotFound(TenantId),
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),
    #[error("job not found: {0}")]
    JobNotFound(FeedJobId),
    /// Conditional update lost: the stored value no longer matches the
    /// caller's snapshot.
    #[error("stale snapshot for tenant {0}")]
    Conflict(TenantId),
    #[error("storage error: {0}")]
    Storage(String),
}

/// The engine's only view of persistence.
///
/// All mutations are per-tenant; callers never issue one operation spanning
/// two tenants, so implementations only need per-key consistency plus the
/// compare-and-swap on `last_execution`.
pub trait RecordStore: Send + Sync {
    fn tenant(&self, id: TenantId) -> Result<Tenant, StoreError>;

    fn upsert_tenant(&self, tenant: Tenant) -> Result<(), StoreError>;

    /// Conditionally advance `last_execution`: succeeds only while the
    /// stored value still equals `expected`. This is the throttle gate's
    /// race closure; a loser sees [`StoreError::Conflict`].
    fn compare_and_set_last_execution(
        &self,
        id: TenantId,
        expected: Option<DateTime<Utc>>,
        new: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    fn record(&self, id: RecordId) -> Result<InventoryRecord, StoreError>;

    fn upsert_record(&self, record: InventoryRecord) -> Result<(), StoreError>;

    /// Bulk sync-status update, one round trip.
    fn set_sync_status(&self, ids: &[RecordId], status: SyncStatus) -> Result<(), StoreError>;

    /// Persist a freshly-submitted job and link every record of the batch
    /// to it.
    fn insert_job(&self, job: FeedJob, record_ids: &[RecordId]) -> Result<(), StoreError>;

    fn update_job(&self, job: &FeedJob) -> Result<(), StoreError>;

    /// Jobs of one tenant whose status the reconciliation poller still needs
    /// to resolve.
    fn outstanding_jobs(&self, tenant_id: TenantId) -> Result<Vec<FeedJob>, StoreError>;

    fn records_for_job(&self, job_id: FeedJobId) -> Result<Vec<RecordId>, StoreError>;

    fn jobs_for_record(&self, record_id: RecordId) -> Result<Vec<FeedJob>, StoreError>;
}

/// In-memory record store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tenants: RwLock<HashMap<TenantId, Tenant>>,
    records: RwLock<HashMap<RecordId, InventoryRecord>>,
    jobs: RwLock<HashMap<FeedJobId, FeedJob>>,
    links: RwLock<HashMap<FeedJobId, Vec<RecordId>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn tenant(&self, id: TenantId) -> Result<Tenant, StoreError> {
        self.tenants
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::TenantNotFound(id))
    }

    fn upsert_tenant(&self, tenant: Tenant) -> Result<(), StoreError> {
        self.tenants.write().unwrap().insert(tenant.id, tenant);
        Ok(())
    }

    fn compare_and_set_last_execution(
        &self,
        id: TenantId,
        expected: Option<DateTime<Utc>>,
        new: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let mut tenants = self.tenants.write().unwrap();
        let tenant = tenants.get_mut(&id).ok_or(StoreError::TenantNotFound(id))?;
        if tenant.last_execution != expected {
            return Err(StoreError::Conflict(id));
        }
        tenant.last_execution = new;
        Ok(())
    }

    fn record(&self, id: RecordId) -> Result<InventoryRecord, StoreError> {
        self.records
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::RecordNotFound(id))
    }

    fn upsert_record(&self, record: InventoryRecord) -> Result<(), StoreError> {
        self.records.write().unwrap().insert(record.id, record);
        Ok(())
    }

    fn set_sync_status(&self, ids: &[RecordId], status: SyncStatus) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap();
        for id in ids {
            let record = records.get_mut(id).ok_or(StoreError::RecordNotFound(*id))?;
            record.sync_status = status;
        }
        Ok(())
    }

    fn insert_job(&self, job: FeedJob, record_ids: &[RecordId]) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap();
        let mut links = self.links.write().unwrap();
        links.insert(job.id, record_ids.to_vec());
        jobs.insert(job.id, job);
        Ok(())
    }

    fn update_job(&self, job: &FeedJob) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap();
        if !jobs.contains_key(&job.id) {
            return Err(StoreError::JobNotFound(job.id));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    fn outstanding_jobs(&self, tenant_id: TenantId) -> Result<Vec<FeedJob>, StoreError> {
        let jobs = self.jobs.read().unwrap();
        let mut result: Vec<_> = jobs
            .values()
            .filter(|j| j.tenant_id == tenant_id && j.status.is_outstanding())
            .cloned()
            .collect();
        result.sort_by_key(|j| (j.submitted_at, j.id));
        Ok(result)
    }

    fn records_for_job(&self, job_id: FeedJobId) -> Result<Vec<RecordId>, StoreError> {
        Ok(self
            .links
            .read()
            .unwrap()
            .get(&job_id)
            .cloned()
            .unwrap_or_default())
    }

    fn jobs_for_record(&self, record_id: RecordId) -> Result<Vec<FeedJob>, StoreError> {
        let links = self.links.read().unwrap();
        let jobs = self.jobs.read().unwrap();
        let mut result: Vec<_> = links
            .iter()
            .filter(|(_, records)| records.contains(&record_id))
            .filter_map(|(job_id, _)| jobs.get(job_id).cloned())
            .collect();
        result.sort_by_key(|j| (j.submitted_at, j.id));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketfeed_feeds::{FeedKind, ProcessingStatus};
    use marketfeed_inventory::TenantCredentials;

    fn tenant() -> Tenant {
        Tenant::new(
            "hatchet-house",
            TenantCredentials {
                seller_id: "SELLER1".into(),
                auth_token: "amzn.mws.token".into(),
            },
        )
    }

    fn record(tenant_id: TenantId) -> InventoryRecord {
        InventoryRecord::new(tenant_id, "SKU-1", "012345678905", "10.00", "1", "New", "2")
    }

    #[test]
    fn cas_succeeds_on_matching_snapshot() {
        let store = InMemoryRecordStore::new();
        let t = tenant();
        let id = t.id;
        store.upsert_tenant(t).unwrap();

        let now = Utc::now();
        store.compare_and_set_last_execution(id, None, Some(now)).unwrap();
        assert_eq!(store.tenant(id).unwrap().last_execution, Some(now));
    }

    #[test]
    fn cas_rejects_stale_snapshot() {
        let store = InMemoryRecordStore::new();
        let t = tenant();
        let id = t.id;
        store.upsert_tenant(t).unwrap();

        let now = Utc::now();
        store.compare_and_set_last_execution(id, None, Some(now)).unwrap();

        // Second run still holds the None snapshot and must lose.
        let err = store
            .compare_and_set_last_execution(id, None, Some(Utc::now()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.tenant(id).unwrap().last_execution, Some(now));
    }

    #[test]
    fn jobs_link_to_all_records_of_the_batch() {
        let store = InMemoryRecordStore::new();
        let t = tenant();
        let tenant_id = t.id;
        store.upsert_tenant(t).unwrap();

        let r1 = record(tenant_id);
        let r2 = record(tenant_id);
        let (id1, id2) = (r1.id, r2.id);
        store.upsert_record(r1).unwrap();
        store.upsert_record(r2).unwrap();

        let job = FeedJob::submitted(tenant_id, FeedKind::Pricing, "feed-1", Utc::now());
        let job_id = job.id;
        store.insert_job(job, &[id1, id2]).unwrap();

        assert_eq!(store.records_for_job(job_id).unwrap(), vec![id1, id2]);
        assert_eq!(store.jobs_for_record(id1).unwrap().len(), 1);
        assert_eq!(store.jobs_for_record(id2).unwrap()[0].id, job_id);
    }

    #[test]
    fn outstanding_jobs_excludes_terminal_statuses() {
        let store = InMemoryRecordStore::new();
        let t = tenant();
        let tenant_id = t.id;
        store.upsert_tenant(t).unwrap();

        let open = FeedJob::submitted(tenant_id, FeedKind::ProductData, "feed-1", Utc::now());
        let mut done = FeedJob::submitted(tenant_id, FeedKind::Pricing, "feed-2", Utc::now());
        done.status = ProcessingStatus::Done;
        let open_id = open.id;
        store.insert_job(open, &[]).unwrap();
        store.insert_job(done, &[]).unwrap();

        let outstanding = store.outstanding_jobs(tenant_id).unwrap();
        assert_eq!(outstanding.len(), 1);
        assert_eq!(outstanding[0].id, open_id);
    }

    #[test]
    fn bulk_sync_status_update_touches_every_record() {
        let store = InMemoryRecordStore::new();
        let t = tenant();
        let tenant_id = t.id;
        store.upsert_tenant(t).unwrap();

        let r1 = record(tenant_id);
        let r2 = record(tenant_id);
        let ids = [r1.id, r2.id];
        store.upsert_record(r1).unwrap();
        store.upsert_record(r2).unwrap();

        store.set_sync_status(&ids, SyncStatus::AwaitingCheck).unwrap();
        for id in ids {
            assert_eq!(store.record(id).unwrap().sync_status, SyncStatus::AwaitingCheck);
        }
    }
}
