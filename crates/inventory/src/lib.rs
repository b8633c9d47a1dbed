//! Inventory domain module.
//!
//! Tenants (seller accounts), their inventory records, and the sync-status
//! lifecycle. Pure domain logic; no IO, no HTTP, no storage.

pub mod record;
pub mod tenant;

pub use record::{FieldChanges, InventoryRecord, SyncStatus};
pub use tenant::{Tenant, TenantCredentials};
