//! Persistence layer for tenants, inventory records and submission jobs.
//!
//! ## Design
//!
//! - One trait, [`RecordStore`], is the engine's only view of storage
//! - `Tenant::last_execution` moves only through a conditional update
//!   (compare-and-swap) so two concurrent submission runs cannot both pass
//!   the throttle gate off a stale snapshot
//! - Record↔job links are many-to-many and append-only
//! - An in-memory implementation backs tests and development

pub mod record_store;

pub use record_store::{InMemoryRecordStore, RecordStore, StoreError};
