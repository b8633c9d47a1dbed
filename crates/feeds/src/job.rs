//! The submission job: one asynchronous unit of work handed to the external
//! system, and its processing-status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marketfeed_core::{FeedJobId, TenantId};

/// Which feed a payload belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    ProductData,
    Pricing,
    InventoryAvailability,
    /// Deletions ride the product feed type with a Delete operation.
    ProductDelete,
}

impl FeedKind {
    /// Feed-type code the external API expects.
    pub fn external_code(&self) -> &'static str {
        match self {
            FeedKind::ProductData | FeedKind::ProductDelete => "_POST_PRODUCT_DATA_",
            FeedKind::Pricing => "_POST_PRODUCT_PRICING_DATA_",
            FeedKind::InventoryAvailability => "_POST_INVENTORY_AVAILABILITY_DATA_",
        }
    }
}

/// Processing status of a submission job.
///
/// `Submitted`/`InProgress` come from the status listing; the `Done*`
/// variants and `DataCorruption` are assigned by reconciliation after the
/// result document is fetched and verified. Codes we do not model are kept
/// raw in `Other` rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Submitted,
    InProgress,
    Done,
    Cancelled,
    DoneWithError,
    DoneWithWarning,
    DoneWithErrorAndWarning,
    /// Result document failed checksum verification; never treated as success.
    DataCorruption,
    Other(String),
}

impl ProcessingStatus {
    /// Map a raw status code from the external status listing.
    pub fn from_external(code: &str) -> Self {
        match code {
            "_SUBMITTED_" => ProcessingStatus::Submitted,
            "_IN_PROGRESS_" => ProcessingStatus::InProgress,
            "_DONE_" => ProcessingStatus::Done,
            "_CANCELLED_" => ProcessingStatus::Cancelled,
            other => ProcessingStatus::Other(other.to_string()),
        }
    }

    /// Whether reconciliation still needs to look at this job.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, ProcessingStatus::Submitted | ProcessingStatus::InProgress)
    }

    fn label(&self) -> &str {
        match self {
            ProcessingStatus::Submitted => "SUBMITTED",
            ProcessingStatus::InProgress => "IN_PROGRESS",
            ProcessingStatus::Done => "DONE",
            ProcessingStatus::Cancelled => "CANCELLED",
            ProcessingStatus::DoneWithError => "DONE_WITH_ERROR",
            ProcessingStatus::DoneWithWarning => "DONE_WITH_WARNING",
            ProcessingStatus::DoneWithErrorAndWarning => "DONE_WITH_ERROR_AND_WITH_WARNING",
            ProcessingStatus::DataCorruption => "DATA_CORRUPTION",
            ProcessingStatus::Other(code) => code,
        }
    }
}

/// Classify a verified result document.
///
/// The DONE variant is picked from the error/warning counts in the
/// processing summary. A top-level status code other than "Complete" is
/// folded into the label (e.g. `Cancelled_DONE_WITH_ERROR`) so the raw
/// outcome stays visible instead of being normalized away.
pub fn classify_result(status_code: &str, errors: u64, warnings: u64) -> ProcessingStatus {
    let base = match (errors > 0, warnings > 0) {
        (false, false) => ProcessingStatus::Done,
        (true, false) => ProcessingStatus::DoneWithError,
        (false, true) => ProcessingStatus::DoneWithWarning,
        (true, true) => ProcessingStatus::DoneWithErrorAndWarning,
    };
    if status_code == "Complete" {
        base
    } else {
        ProcessingStatus::Other(format!("{status_code}_{}", base.label()))
    }
}

/// One feed submission job. Created once per successful external submission
/// call; status moves only through the reconciliation poller. Never deleted
/// by normal flow; the per-record history is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedJob {
    pub id: FeedJobId,
    /// Job id assigned by the external system.
    pub external_id: String,
    pub kind: FeedKind,
    pub tenant_id: TenantId,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: ProcessingStatus,
}

impl FeedJob {
    pub fn submitted(
        tenant_id: TenantId,
        kind: FeedKind,
        external_id: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: FeedJobId::new(),
            external_id: external_id.into(),
            kind,
            tenant_id,
            submitted_at,
            started_at: None,
            completed_at: None,
            status: ProcessingStatus::Submitted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_codes_round_trip_for_known_statuses() {
        assert_eq!(ProcessingStatus::from_external("_SUBMITTED_"), ProcessingStatus::Submitted);
        assert_eq!(ProcessingStatus::from_external("_IN_PROGRESS_"), ProcessingStatus::InProgress);
        assert_eq!(ProcessingStatus::from_external("_DONE_"), ProcessingStatus::Done);
        assert_eq!(ProcessingStatus::from_external("_CANCELLED_"), ProcessingStatus::Cancelled);
    }

    #[test]
    fn unknown_raw_codes_are_preserved() {
        assert_eq!(
            ProcessingStatus::from_external("_IN_SAFETY_NET_"),
            ProcessingStatus::Other("_IN_SAFETY_NET_".into())
        );
    }

    #[test]
    fn only_submitted_and_in_progress_are_outstanding() {
        assert!(ProcessingStatus::Submitted.is_outstanding());
        assert!(ProcessingStatus::InProgress.is_outstanding());
        assert!(!ProcessingStatus::Done.is_outstanding());
        assert!(!ProcessingStatus::DataCorruption.is_outstanding());
        assert!(!ProcessingStatus::Other("_UNCONFIRMED_".into()).is_outstanding());
    }

    #[test]
    fn classification_matrix() {
        assert_eq!(classify_result("Complete", 0, 0), ProcessingStatus::Done);
        assert_eq!(classify_result("Complete", 2, 0), ProcessingStatus::DoneWithError);
        assert_eq!(classify_result("Complete", 0, 3), ProcessingStatus::DoneWithWarning);
        assert_eq!(
            classify_result("Complete", 1, 1),
            ProcessingStatus::DoneWithErrorAndWarning
        );
    }

    #[test]
    fn non_complete_status_code_folds_into_the_label() {
        assert_eq!(
            classify_result("Cancelled", 0, 0),
            ProcessingStatus::Other("Cancelled_DONE".into())
        );
        assert_eq!(
            classify_result("Cancelled", 4, 0),
            ProcessingStatus::Other("Cancelled_DONE_WITH_ERROR".into())
        );
    }
}
