//! Per-tenant batch grouping.

use marketfeed_core::TenantId;
use marketfeed_inventory::InventoryRecord;

/// All records of one tenant, ready for one submission job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantBatch {
    pub tenant_id: TenantId,
    pub records: Vec<InventoryRecord>,
}

/// Partition an arbitrary, unordered record collection into one maximal
/// group per distinct tenant.
///
/// Records are sorted by tenant id first, so tenant-interleaved input never
/// splits a tenant across groups or drops records. The sort is stable:
/// within a group, records keep their input order (message ids depend on it).
pub fn group_by_tenant(mut records: Vec<InventoryRecord>) -> Vec<TenantBatch> {
    records.sort_by_key(|r| r.tenant_id);

    let mut batches: Vec<TenantBatch> = Vec::new();
    for record in records {
        match batches.last_mut() {
            Some(batch) if batch.tenant_id == record.tenant_id => batch.records.push(record),
            _ => batches.push(TenantBatch {
                tenant_id: record.tenant_id,
                records: vec![record],
            }),
        }
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketfeed_core::RecordId;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn tenant(n: u128) -> TenantId {
        TenantId::from_uuid(Uuid::from_u128(n))
    }

    fn record(t: TenantId, sku: &str) -> InventoryRecord {
        InventoryRecord::new(t, sku, "012345678905", "9.99", "1", "New", "2")
    }

    #[test]
    fn interleaved_tenants_still_form_one_group_each() {
        let (a, b) = (tenant(1), tenant(2));
        let input = vec![
            record(a, "A1"),
            record(b, "B1"),
            record(a, "A2"),
            record(b, "B2"),
            record(a, "A3"),
        ];
        let batches = group_by_tenant(input);

        assert_eq!(batches.len(), 2);
        let a_batch = batches.iter().find(|g| g.tenant_id == a).unwrap();
        let b_batch = batches.iter().find(|g| g.tenant_id == b).unwrap();
        assert_eq!(a_batch.records.len(), 3);
        assert_eq!(b_batch.records.len(), 2);
    }

    #[test]
    fn input_order_is_preserved_within_a_group() {
        let a = tenant(1);
        let input = vec![record(a, "first"), record(tenant(2), "x"), record(a, "second")];
        let batches = group_by_tenant(input);
        let a_batch = batches.iter().find(|g| g.tenant_id == a).unwrap();
        let skus: Vec<_> = a_batch.records.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["first", "second"]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_tenant(Vec::new()).is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the union of groups equals the input set, with no
            /// record in two groups, for any input ordering.
            #[test]
            fn grouping_is_a_partition(assignments in proptest::collection::vec(0u128..5, 0..64)) {
                let input: Vec<InventoryRecord> = assignments
                    .iter()
                    .enumerate()
                    .map(|(i, t)| record(tenant(t + 1), &format!("SKU-{i}")))
                    .collect();
                let input_ids: HashSet<RecordId> = input.iter().map(|r| r.id).collect();

                let batches = group_by_tenant(input);

                let mut seen = HashSet::new();
                for batch in &batches {
                    for r in &batch.records {
                        prop_assert_eq!(r.tenant_id, batch.tenant_id);
                        prop_assert!(seen.insert(r.id), "record appears in two groups");
                    }
                }
                prop_assert_eq!(seen, input_ids);

                let tenants: HashSet<TenantId> = batches.iter().map(|b| b.tenant_id).collect();
                prop_assert_eq!(tenants.len(), batches.len(), "duplicate tenant group");
            }
        }
    }
}
