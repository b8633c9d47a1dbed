//! Feed construction and submission-job model.
//!
//! Turns a tenant's batch of inventory records into the provider payload
//! bodies for one submission, and models the asynchronous job the external
//! system hands back (its processing-status lifecycle and terminal
//! classification). Pure transforms; the wire client lives elsewhere.

pub mod builder;
pub mod condition;
pub mod job;

pub use builder::{FeedOperation, FeedPayload, build_feeds};
pub use condition::map_condition;
pub use job::{FeedJob, FeedKind, ProcessingStatus, classify_result};

use thiserror::Error;

/// Payload-building input errors.
///
/// These fail the whole batch for the offending tenant: a bad value must
/// not silently submit wrong data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Condition string outside the fixed external vocabulary.
    #[error("unknown condition: {0:?}")]
    UnknownCondition(String),

    /// A numeric field that could not be parsed as a float.
    #[error("invalid number in field {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}
