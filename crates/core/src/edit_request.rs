//! Post-approval corrections to a stock count entry.
//!
//! Once an entry is approved its manual count can only change through an
//! edit request that is itself approved. At most one request per entry may
//! be pending at a time.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::status::ReviewStatus;
use crate::stock_count::MAX_NOTE_LENGTH;
use crate::types::{DbId, Timestamp};

/// Minimum length of an edit reason, counted after trimming.
pub const MIN_EDIT_REASON_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub id: DbId,
    pub stock_count_entry_id: DbId,
    /// The entry's manual count when the request was made.
    pub old_manual_packs: i64,
    pub new_manual_packs: i64,
    pub edit_reason: String,
    pub status: ReviewStatus,
    pub requested_by: DbId,
    pub reviewed_by: Option<DbId>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
    pub version: i32,
}

/// Input for proposing a new manual count on an approved entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestEdit {
    #[validate(range(min = 0, message = "new_manual_packs must not be negative"))]
    pub new_manual_packs: i64,
    pub edit_reason: String,
}

/// A validated edit request ready to be inserted by a store.
///
/// The store snapshots `old_manual_packs` from the entry inside the same
/// transaction that inserts the request.
#[derive(Debug, Clone)]
pub struct NewEditRequest {
    pub stock_count_entry_id: DbId,
    pub new_manual_packs: i64,
    pub edit_reason: String,
    pub requested_by: DbId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditRequestFilter {
    pub status: Option<ReviewStatus>,
    pub stock_count_entry_id: Option<DbId>,
    pub requested_by: Option<DbId>,
}

impl EditRequestFilter {
    pub fn matches(&self, request: &EditRequest) -> bool {
        self.status.map_or(true, |s| request.status == s)
            && self
                .stock_count_entry_id
                .map_or(true, |e| request.stock_count_entry_id == e)
            && self.requested_by.map_or(true, |u| request.requested_by == u)
    }
}

/// Validate an edit reason: at least [`MIN_EDIT_REASON_LENGTH`] characters
/// once surrounding whitespace is removed.
pub fn validate_edit_reason(reason: &str) -> Result<(), CoreError> {
    let len = reason.trim().chars().count();
    if len < MIN_EDIT_REASON_LENGTH {
        return Err(CoreError::Validation(format!(
            "edit_reason must be at least {MIN_EDIT_REASON_LENGTH} characters"
        )));
    }
    if len > MAX_NOTE_LENGTH {
        return Err(CoreError::Validation(format!(
            "edit_reason cannot exceed {MAX_NOTE_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_reason_of_exactly_minimum_length_passes() {
        assert!(validate_edit_reason("0123456789").is_ok());
    }

    #[test]
    fn test_short_reason_fails() {
        assert_matches!(
            validate_edit_reason("too short"),
            Err(CoreError::Validation(msg)) if msg.contains("at least 10")
        );
    }

    #[test]
    fn test_padding_does_not_count_towards_length() {
        assert!(validate_edit_reason("   recount   ").is_err());
    }

    #[test]
    fn test_reason_length_counts_characters_not_bytes() {
        // Nine multi-byte characters.
        assert!(validate_edit_reason("ééééééééé").is_err());
        assert!(validate_edit_reason("éééééééééé").is_ok());
    }

    #[test]
    fn test_negative_new_manual_packs_fails_validation() {
        let input = RequestEdit {
            new_manual_packs: -3,
            edit_reason: "recount after damage found".into(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_filter_defaults_match_all() {
        let now = chrono::Utc::now();
        let request = EditRequest {
            id: 1,
            stock_count_entry_id: 9,
            old_manual_packs: 50,
            new_manual_packs: 48,
            edit_reason: "recount after damage found".into(),
            status: ReviewStatus::Pending,
            requested_by: 5,
            reviewed_by: None,
            rejection_reason: None,
            created_at: now,
            reviewed_at: None,
            updated_at: now,
            version: 1,
        };
        assert!(EditRequestFilter::default().matches(&request));
        assert!(EditRequestFilter {
            stock_count_entry_id: Some(9),
            ..Default::default()
        }
        .matches(&request));
        assert!(!EditRequestFilter {
            status: Some(ReviewStatus::Approved),
            ..Default::default()
        }
        .matches(&request));
    }
}
