//! Stock count entries: a manual pack count for one product on one date,
//! compared against the system count computed by inventory accounting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::status::{Decision, ReviewStatus};
use crate::types::{DbId, Timestamp};

/// Maximum length for submitter notes, admin notes and rejection reasons.
pub const MAX_NOTE_LENGTH: usize = 2_000;

/// A submitted manual count and its review state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCountEntry {
    pub id: DbId,
    pub product_id: DbId,
    pub stock_date: NaiveDate,
    pub manual_packs: i64,
    pub system_packs: i64,
    /// Always `manual_packs - system_packs`.
    pub variance_packs: i64,
    pub status: ReviewStatus,
    pub notes: Option<String>,
    pub submitted_by: DbId,
    pub reviewed_by: Option<DbId>,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
    /// Incremented on every mutation so clients can detect stale views.
    pub version: i32,
}

impl StockCountEntry {
    /// Replace the manual count and recompute the variance from it.
    pub fn set_manual_packs(&mut self, manual_packs: i64) {
        self.manual_packs = manual_packs;
        self.variance_packs = compute_variance(manual_packs, self.system_packs);
    }
}

/// Signed difference between the manual and the system count.
pub fn compute_variance(manual_packs: i64, system_packs: i64) -> i64 {
    manual_packs - system_packs
}

/// Input for submitting a manual count.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitStockCount {
    #[validate(range(min = 1, message = "product_id must be a positive id"))]
    pub product_id: DbId,
    pub stock_date: NaiveDate,
    #[validate(range(min = 0, message = "manual_packs must not be negative"))]
    pub manual_packs: i64,
    #[validate(length(max = 2000, message = "notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

/// A fully resolved entry ready to be inserted by a store.
#[derive(Debug, Clone)]
pub struct NewStockCount {
    pub product_id: DbId,
    pub stock_date: NaiveDate,
    pub manual_packs: i64,
    pub system_packs: i64,
    pub notes: Option<String>,
    pub submitted_by: DbId,
}

/// A reviewer's decision on a pending entry, as handed to the store.
#[derive(Debug, Clone)]
pub enum EntryDecision {
    Approve {
        reviewer: DbId,
        admin_notes: Option<String>,
    },
    Reject {
        reviewer: DbId,
        reason: String,
    },
}

impl EntryDecision {
    pub fn reviewer(&self) -> DbId {
        match self {
            EntryDecision::Approve { reviewer, .. } | EntryDecision::Reject { reviewer, .. } => {
                *reviewer
            }
        }
    }

    pub fn decision(&self) -> Decision {
        match self {
            EntryDecision::Approve { .. } => Decision::Approve,
            EntryDecision::Reject { .. } => Decision::Reject,
        }
    }

    pub fn target_status(&self) -> ReviewStatus {
        match self {
            EntryDecision::Approve { .. } => ReviewStatus::Approved,
            EntryDecision::Reject { .. } => ReviewStatus::Rejected,
        }
    }
}

/// Filters for listing entries. `None` fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryFilter {
    pub status: Option<ReviewStatus>,
    pub product_id: Option<DbId>,
    pub stock_date: Option<NaiveDate>,
    pub submitted_by: Option<DbId>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &StockCountEntry) -> bool {
        self.status.map_or(true, |s| entry.status == s)
            && self.product_id.map_or(true, |p| entry.product_id == p)
            && self.stock_date.map_or(true, |d| entry.stock_date == d)
            && self.submitted_by.map_or(true, |u| entry.submitted_by == u)
    }
}

/// A catalog product, as supplied by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub product_no: String,
}

/// One line of the manual-versus-system comparison for a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub product_id: DbId,
    pub product_name: String,
    pub product_no: String,
    pub entry_id: Option<DbId>,
    pub manual_packs: Option<i64>,
    pub system_packs: i64,
    pub variance_packs: Option<i64>,
    pub status: Option<ReviewStatus>,
}

/// Entry counts for the current day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub submitted: i64,
    pub pending: i64,
    pub approved: i64,
}

/// Dashboard counters for the reconciliation page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub today: DailyStats,
    pub pending_edit_requests: i64,
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that a stock date is not in the future relative to `today`.
pub fn validate_stock_date(stock_date: NaiveDate, today: NaiveDate) -> Result<(), CoreError> {
    if stock_date > today {
        return Err(CoreError::Validation(format!(
            "stock_date {stock_date} is in the future"
        )));
    }
    Ok(())
}

/// Validate a rejection reason: required, non-blank, bounded.
pub fn validate_rejection_reason(reason: &str) -> Result<(), CoreError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "rejection_reason must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_NOTE_LENGTH {
        return Err(CoreError::Validation(format!(
            "rejection_reason cannot exceed {MAX_NOTE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate optional admin notes given on approval.
pub fn validate_admin_notes(notes: Option<&str>) -> Result<(), CoreError> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTE_LENGTH => Err(CoreError::Validation(format!(
            "admin_notes cannot exceed {MAX_NOTE_LENGTH} characters"
        ))),
        _ => Ok(()),
    }
}

/// Collapse blank optional text to `None` and trim the rest.
pub fn normalize_optional_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample_entry() -> StockCountEntry {
        let now = Utc::now();
        StockCountEntry {
            id: 1,
            product_id: 7,
            stock_date: date("2025-01-10"),
            manual_packs: 50,
            system_packs: 47,
            variance_packs: 3,
            status: ReviewStatus::Approved,
            notes: None,
            submitted_by: 10,
            reviewed_by: Some(20),
            admin_notes: None,
            rejection_reason: None,
            created_at: now,
            reviewed_at: Some(now),
            updated_at: now,
            version: 2,
        }
    }

    #[test]
    fn test_variance_is_signed_difference() {
        assert_eq!(compute_variance(50, 47), 3);
        assert_eq!(compute_variance(40, 47), -7);
        assert_eq!(compute_variance(0, 0), 0);
    }

    #[test]
    fn test_set_manual_packs_recomputes_variance() {
        let mut entry = sample_entry();
        entry.set_manual_packs(48);
        assert_eq!(entry.manual_packs, 48);
        assert_eq!(entry.variance_packs, 1);
        assert_eq!(entry.system_packs, 47);
    }

    #[test]
    fn test_negative_manual_packs_fails_validation() {
        let input = SubmitStockCount {
            product_id: 1,
            stock_date: date("2025-01-10"),
            manual_packs: -1,
            notes: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_non_positive_product_id_fails_validation() {
        let input = SubmitStockCount {
            product_id: 0,
            stock_date: date("2025-01-10"),
            manual_packs: 5,
            notes: None,
        };
        let err: CoreError = input.validate().unwrap_err().into();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("product_id"));
    }

    #[test]
    fn test_zero_manual_packs_is_valid() {
        let input = SubmitStockCount {
            product_id: 1,
            stock_date: date("2025-01-10"),
            manual_packs: 0,
            notes: Some("empty shelf".into()),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_future_stock_date_rejected() {
        let today = date("2025-01-10");
        assert!(validate_stock_date(today, today).is_ok());
        assert!(validate_stock_date(date("2025-01-09"), today).is_ok());
        assert_matches!(
            validate_stock_date(date("2025-01-11"), today),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn test_blank_rejection_reason_rejected() {
        assert!(validate_rejection_reason("").is_err());
        assert!(validate_rejection_reason("   \t").is_err());
        assert!(validate_rejection_reason("count sheet missing").is_ok());
    }

    #[test]
    fn test_overlong_rejection_reason_rejected() {
        let reason = "x".repeat(MAX_NOTE_LENGTH + 1);
        assert!(validate_rejection_reason(&reason).is_err());
    }

    #[test]
    fn test_admin_notes_limit() {
        assert!(validate_admin_notes(None).is_ok());
        assert!(validate_admin_notes(Some("ok")).is_ok());
        let long = "n".repeat(MAX_NOTE_LENGTH + 1);
        assert!(validate_admin_notes(Some(&long)).is_err());
    }

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some("  ".into())), None);
        assert_eq!(
            normalize_optional_text(Some(" ok ".into())),
            Some("ok".to_string())
        );
    }

    #[test]
    fn test_filter_matches_on_every_field() {
        let entry = sample_entry();
        assert!(EntryFilter::default().matches(&entry));
        assert!(EntryFilter {
            status: Some(ReviewStatus::Approved),
            product_id: Some(7),
            stock_date: Some(date("2025-01-10")),
            submitted_by: Some(10),
        }
        .matches(&entry));
        assert!(!EntryFilter {
            status: Some(ReviewStatus::Pending),
            ..Default::default()
        }
        .matches(&entry));
        assert!(!EntryFilter {
            product_id: Some(8),
            ..Default::default()
        }
        .matches(&entry));
    }

    #[test]
    fn test_decision_target_status() {
        let approve = EntryDecision::Approve {
            reviewer: 3,
            admin_notes: None,
        };
        let reject = EntryDecision::Reject {
            reviewer: 4,
            reason: "wrong shelf".into(),
        };
        assert_eq!(approve.target_status(), ReviewStatus::Approved);
        assert_eq!(reject.target_status(), ReviewStatus::Rejected);
        assert_eq!(approve.reviewer(), 3);
        assert_eq!(reject.reviewer(), 4);
    }
}
