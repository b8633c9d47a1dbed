use serde::{Deserialize, Serialize};

use marketfeed_core::{RecordId, TenantId};

/// Synchronization state of one inventory record against the marketplace.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Local changes have not been submitted.
    NotSynced = 0,
    /// The last submission completed cleanly.
    Synced = 1,
    /// Submitted; waiting for the reconciliation poller to confirm.
    AwaitingCheck = 2,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::NotSynced
    }
}

/// One tenant-scoped inventory change record.
///
/// Business fields are kept as the text the upload layer persisted; numeric
/// coercion happens at feed-build time so a bad value fails loudly there
/// instead of being silently reinterpreted on ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub sku: String,
    pub upc: String,
    pub standard_price: String,
    pub quantity: String,
    pub condition: String,
    pub handling_time: String,
    pub sync_status: SyncStatus,
}

/// Proposed mutation of the sync-relevant business fields.
///
/// An explicit diff: callers pass the new values and [`InventoryRecord::apply_changes`]
/// compares them against what was loaded, instead of tracking hidden dirty
/// state on the instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChanges {
    pub standard_price: Option<String>,
    pub quantity: Option<String>,
    pub condition: Option<String>,
    pub handling_time: Option<String>,
}

impl InventoryRecord {
    pub fn new(
        tenant_id: TenantId,
        sku: impl Into<String>,
        upc: impl Into<String>,
        standard_price: impl Into<String>,
        quantity: impl Into<String>,
        condition: impl Into<String>,
        handling_time: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            tenant_id,
            sku: sku.into(),
            upc: upc.into(),
            standard_price: standard_price.into(),
            quantity: quantity.into(),
            condition: condition.into(),
            handling_time: handling_time.into(),
            sync_status: SyncStatus::NotSynced,
        }
    }

    /// Apply a field diff. Any change to price, quantity, condition or
    /// handling time resets `sync_status` to [`SyncStatus::NotSynced`].
    ///
    /// Returns `true` when at least one field actually changed.
    pub fn apply_changes(&mut self, changes: &FieldChanges) -> bool {
        let mut dirty = false;

        fn assign(field: &mut String, value: &Option<String>, dirty: &mut bool) {
            if let Some(v) = value {
                if field != v {
                    *field = v.clone();
                    *dirty = true;
                }
            }
        }

        assign(&mut self.standard_price, &changes.standard_price, &mut dirty);
        assign(&mut self.quantity, &changes.quantity, &mut dirty);
        assign(&mut self.condition, &changes.condition, &mut dirty);
        assign(&mut self.handling_time, &changes.handling_time, &mut dirty);

        if dirty {
            self.sync_status = SyncStatus::NotSynced;
        }
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InventoryRecord {
        let mut r = InventoryRecord::new(
            TenantId::new(),
            "SKU-1",
            "012345678905",
            "19.99",
            "4",
            "New",
            "2",
        );
        r.sync_status = SyncStatus::Synced;
        r
    }

    #[test]
    fn changed_price_resets_sync_status() {
        let mut r = record();
        let dirty = r.apply_changes(&FieldChanges {
            standard_price: Some("21.50".into()),
            ..Default::default()
        });
        assert!(dirty);
        assert_eq!(r.standard_price, "21.50");
        assert_eq!(r.sync_status, SyncStatus::NotSynced);
    }

    #[test]
    fn identical_values_keep_sync_status() {
        let mut r = record();
        let dirty = r.apply_changes(&FieldChanges {
            standard_price: Some("19.99".into()),
            quantity: Some("4".into()),
            condition: Some("New".into()),
            handling_time: Some("2".into()),
        });
        assert!(!dirty);
        assert_eq!(r.sync_status, SyncStatus::Synced);
    }

    #[test]
    fn empty_diff_is_a_no_op() {
        let mut r = record();
        assert!(!r.apply_changes(&FieldChanges::default()));
        assert_eq!(r.sync_status, SyncStatus::Synced);
    }

    #[test]
    fn each_tracked_field_triggers_the_reset() {
        for changes in [
            FieldChanges { quantity: Some("9".into()), ..Default::default() },
            FieldChanges { condition: Some("UsedGood".into()), ..Default::default() },
            FieldChanges { handling_time: Some("5".into()), ..Default::default() },
        ] {
            let mut r = record();
            assert!(r.apply_changes(&changes));
            assert_eq!(r.sync_status, SyncStatus::NotSynced);
        }
    }
}
