//! `marketfeed-core`: shared identifier and error primitives.
//!
//! This crate contains **pure domain** building blocks (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::CoreError;
pub use id::{FeedJobId, RecordId, TenantId};
