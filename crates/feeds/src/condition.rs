//! Item-condition vocabulary.
//!
//! The external system accepts a fixed, capitalized set of condition codes.
//! Internal values are matched case-insensitively with spaces stripped, so
//! "Used Like New" and "usedlikenew" both map to `UsedLikeNew`.

use crate::FeedError;

/// Map an internal condition value to the external vocabulary.
///
/// Unrecognized values are an error: submitting a guessed condition would
/// silently corrupt the listing.
pub fn map_condition(value: &str) -> Result<&'static str, FeedError> {
    let key = value.replace(' ', "").to_lowercase();

    let mapped = match key.as_str() {
        "new" => "New",
        "usedlikenew" => "UsedLikeNew",
        "usedverygood" => "UsedVeryGood",
        "usedgood" => "UsedGood",
        "usedacceptable" => "UsedAcceptable",
        "collectiblelikenew" => "CollectibleLikeNew",
        "collectibleverygood" => "CollectibleVeryGood",
        "collectiblegood" => "CollectibleGood",
        "collectibleacceptable" => "CollectibleAcceptable",
        "refurbished" => "Refurbished",
        "club" => "Club",
        _ => return Err(FeedError::UnknownCondition(value.to_string())),
    };
    Ok(mapped)
}
