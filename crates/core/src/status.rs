//! Review status shared by stock count entries and edit requests.
//!
//! Both entity types follow the same two-step lifecycle:
//!
//! ```text
//! PENDING --approve--> APPROVED (terminal)
//! PENDING --reject---> REJECTED (terminal)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// All valid status values, in lifecycle order.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// A reviewer's verdict on a pending item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Pending => STATUS_PENDING,
            ReviewStatus::Approved => STATUS_APPROVED,
            ReviewStatus::Rejected => STATUS_REJECTED,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }

    /// Pending and approved items occupy their slot; rejected ones free it.
    pub fn is_active(self) -> bool {
        !matches!(self, ReviewStatus::Rejected)
    }

    /// Apply a decision, returning the resulting status.
    ///
    /// Fails with [`CoreError::InvalidState`] when the item was already reviewed.
    pub fn transition(self, decision: Decision) -> Result<ReviewStatus, CoreError> {
        if self.is_terminal() {
            return Err(CoreError::InvalidState(format!(
                "Already reviewed (status is '{self}')"
            )));
        }
        Ok(match decision {
            Decision::Approve => ReviewStatus::Approved,
            Decision::Reject => ReviewStatus::Rejected,
        })
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(ReviewStatus::Pending),
            STATUS_APPROVED => Ok(ReviewStatus::Approved),
            STATUS_REJECTED => Ok(ReviewStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}
