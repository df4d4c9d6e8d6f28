//! In-process implementations of the workflow collaborators.
//!
//! [`InMemoryStore`] keeps both collections behind a single async mutex, so
//! each trait method runs as one atomic step exactly like a database
//! transaction would. [`InMemoryInventory`] serves a fixed product list and
//! a ledger of stock movements.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use crate::edit_request::{EditRequest, EditRequestFilter, NewEditRequest};
use crate::error::CoreError;
use crate::pagination::{Page, PageRequest};
use crate::ports::{InventoryLedger, ProductCatalog, StockCountStore};
use crate::status::{Decision, ReviewStatus};
use crate::stock_count::{
    compute_variance, DailyStats, EntryDecision, EntryFilter, NewStockCount, Product,
    StockCountEntry, SummaryStats,
};
use crate::types::DbId;

#[derive(Default)]
struct StoreState {
    next_entry_id: DbId,
    next_request_id: DbId,
    entries: BTreeMap<DbId, StockCountEntry>,
    edit_requests: BTreeMap<DbId, EditRequest>,
}

/// A [`StockCountStore`] held entirely in memory.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn entry_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "StockCountEntry",
        id,
    }
}

fn request_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "EditRequest",
        id,
    }
}

#[async_trait]
impl StockCountStore for InMemoryStore {
    async fn insert_entry(&self, input: &NewStockCount) -> Result<StockCountEntry, CoreError> {
        let mut state = self.state.lock().await;

        let slot_taken = state.entries.values().any(|e| {
            e.product_id == input.product_id
                && e.stock_date == input.stock_date
                && e.status.is_active()
        });
        if slot_taken {
            return Err(CoreError::Conflict(format!(
                "A stock count for product {} on {} is already pending or approved",
                input.product_id, input.stock_date
            )));
        }

        state.next_entry_id += 1;
        let now = Utc::now();
        let entry = StockCountEntry {
            id: state.next_entry_id,
            product_id: input.product_id,
            stock_date: input.stock_date,
            manual_packs: input.manual_packs,
            system_packs: input.system_packs,
            variance_packs: compute_variance(input.manual_packs, input.system_packs),
            status: ReviewStatus::Pending,
            notes: input.notes.clone(),
            submitted_by: input.submitted_by,
            reviewed_by: None,
            admin_notes: None,
            rejection_reason: None,
            created_at: now,
            reviewed_at: None,
            updated_at: now,
            version: 1,
        };
        state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find_entry(&self, id: DbId) -> Result<Option<StockCountEntry>, CoreError> {
        Ok(self.state.lock().await.entries.get(&id).cloned())
    }

    async fn review_entry(
        &self,
        id: DbId,
        decision: &EntryDecision,
    ) -> Result<StockCountEntry, CoreError> {
        let mut state = self.state.lock().await;
        let entry = state.entries.get_mut(&id).ok_or_else(|| entry_not_found(id))?;

        entry.status = entry.status.transition(decision.decision())?;

        let now = Utc::now();
        entry.reviewed_by = Some(decision.reviewer());
        entry.reviewed_at = Some(now);
        entry.updated_at = now;
        entry.version += 1;
        match decision {
            EntryDecision::Approve { admin_notes, .. } => {
                entry.admin_notes = admin_notes.clone();
            }
            EntryDecision::Reject { reason, .. } => {
                entry.rejection_reason = Some(reason.clone());
            }
        }
        Ok(entry.clone())
    }

    async fn list_entries(
        &self,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<StockCountEntry>, CoreError> {
        let state = self.state.lock().await;
        let matching: Vec<_> = state
            .entries
            .values()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        Ok(Page::from_all(matching, page))
    }

    async fn active_entries_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<StockCountEntry>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .values()
            .filter(|e| e.stock_date == date && e.status.is_active())
            .cloned()
            .collect())
    }

    async fn insert_edit_request(
        &self,
        input: &NewEditRequest,
    ) -> Result<EditRequest, CoreError> {
        let mut state = self.state.lock().await;
        let entry = state
            .entries
            .get(&input.stock_count_entry_id)
            .ok_or_else(|| entry_not_found(input.stock_count_entry_id))?;

        if entry.status != ReviewStatus::Approved {
            return Err(CoreError::InvalidState(format!(
                "Edits can only be requested for approved entries (status is '{}')",
                entry.status
            )));
        }
        let old_manual_packs = entry.manual_packs;

        let has_pending = state.edit_requests.values().any(|r| {
            r.stock_count_entry_id == input.stock_count_entry_id
                && r.status == ReviewStatus::Pending
        });
        if has_pending {
            return Err(CoreError::Conflict(format!(
                "Stock count entry {} already has a pending edit request",
                input.stock_count_entry_id
            )));
        }

        state.next_request_id += 1;
        let now = Utc::now();
        let request = EditRequest {
            id: state.next_request_id,
            stock_count_entry_id: input.stock_count_entry_id,
            old_manual_packs,
            new_manual_packs: input.new_manual_packs,
            edit_reason: input.edit_reason.clone(),
            status: ReviewStatus::Pending,
            requested_by: input.requested_by,
            reviewed_by: None,
            rejection_reason: None,
            created_at: now,
            reviewed_at: None,
            updated_at: now,
            version: 1,
        };
        state.edit_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_edit_request(&self, id: DbId) -> Result<Option<EditRequest>, CoreError> {
        Ok(self.state.lock().await.edit_requests.get(&id).cloned())
    }

    async fn approve_edit_request(
        &self,
        id: DbId,
        reviewer: DbId,
    ) -> Result<(EditRequest, StockCountEntry), CoreError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let request = state
            .edit_requests
            .get_mut(&id)
            .ok_or_else(|| request_not_found(id))?;
        let next_status = request.status.transition(Decision::Approve)?;

        let entry = state
            .entries
            .get_mut(&request.stock_count_entry_id)
            .ok_or_else(|| entry_not_found(request.stock_count_entry_id))?;
        if entry.status != ReviewStatus::Approved {
            return Err(CoreError::InvalidState(format!(
                "Stock count entry {} is no longer approved",
                entry.id
            )));
        }
        if entry.manual_packs != request.old_manual_packs {
            return Err(CoreError::InvalidState(format!(
                "Stock count entry {} changed since the edit was requested",
                entry.id
            )));
        }

        // Both checks passed: apply the request and the entry update together.
        let now = Utc::now();
        request.status = next_status;
        request.reviewed_by = Some(reviewer);
        request.reviewed_at = Some(now);
        request.updated_at = now;
        request.version += 1;

        entry.set_manual_packs(request.new_manual_packs);
        entry.updated_at = now;
        entry.version += 1;

        Ok((request.clone(), entry.clone()))
    }

    async fn reject_edit_request(
        &self,
        id: DbId,
        reviewer: DbId,
        reason: &str,
    ) -> Result<EditRequest, CoreError> {
        let mut state = self.state.lock().await;
        let request = state
            .edit_requests
            .get_mut(&id)
            .ok_or_else(|| request_not_found(id))?;
        request.status = request.status.transition(Decision::Reject)?;

        let now = Utc::now();
        request.reviewed_by = Some(reviewer);
        request.rejection_reason = Some(reason.to_string());
        request.reviewed_at = Some(now);
        request.updated_at = now;
        request.version += 1;
        Ok(request.clone())
    }

    async fn list_edit_requests(
        &self,
        filter: &EditRequestFilter,
        page: PageRequest,
    ) -> Result<Page<EditRequest>, CoreError> {
        let state = self.state.lock().await;
        let matching: Vec<_> = state
            .edit_requests
            .values()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Ok(Page::from_all(matching, page))
    }

    async fn summary_stats(&self, today: NaiveDate) -> Result<SummaryStats, CoreError> {
        let state = self.state.lock().await;
        let mut daily = DailyStats::default();
        for entry in state.entries.values().filter(|e| e.stock_date == today) {
            daily.submitted += 1;
            match entry.status {
                ReviewStatus::Pending => daily.pending += 1,
                ReviewStatus::Approved => daily.approved += 1,
                ReviewStatus::Rejected => {}
            }
        }
        let pending_edit_requests = state
            .edit_requests
            .values()
            .filter(|r| r.status == ReviewStatus::Pending)
            .count() as i64;

        Ok(SummaryStats {
            today: daily,
            pending_edit_requests,
        })
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// A fixed catalog plus a ledger of signed pack movements.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    products: Vec<Product>,
    movements: Vec<(DbId, NaiveDate, i64)>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, id: DbId, name: &str, product_no: &str) -> Self {
        self.products.push(Product {
            id,
            name: name.to_string(),
            product_no: product_no.to_string(),
        });
        self.products.sort_by(|a, b| a.product_no.cmp(&b.product_no));
        self
    }

    /// Record a stock movement; positive for receipts, negative for issues.
    pub fn with_movement(mut self, product_id: DbId, date: NaiveDate, packs: i64) -> Self {
        self.movements.push((product_id, date, packs));
        self
    }
}

#[async_trait]
impl InventoryLedger for InMemoryInventory {
    async fn system_packs(&self, product_id: DbId, date: NaiveDate) -> Result<i64, CoreError> {
        Ok(self
            .movements
            .iter()
            .filter(|(p, d, _)| *p == product_id && *d <= date)
            .map(|(_, _, packs)| packs)
            .sum())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryInventory {
    async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        Ok(self.products.clone())
    }

    async fn find_product(&self, id: DbId) -> Result<Option<Product>, CoreError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_ledger_sums_movements_up_to_date() {
        let inventory = InMemoryInventory::new()
            .with_product(1, "Cola 24x330ml", "P-001")
            .with_movement(1, date("2025-01-01"), 60)
            .with_movement(1, date("2025-01-05"), -13)
            .with_movement(1, date("2025-01-11"), 20)
            .with_movement(2, date("2025-01-01"), 99);

        assert_eq!(inventory.system_packs(1, date("2025-01-10")).await.unwrap(), 47);
        assert_eq!(inventory.system_packs(1, date("2025-01-11")).await.unwrap(), 67);
        assert_eq!(inventory.system_packs(1, date("2024-12-31")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_catalog_is_ordered_by_product_no() {
        let inventory = InMemoryInventory::new()
            .with_product(2, "Water", "P-002")
            .with_product(1, "Cola", "P-001");

        let products = inventory.list_products().await.unwrap();
        assert_eq!(products[0].product_no, "P-001");
        assert_eq!(products[1].product_no, "P-002");
        assert!(inventory.find_product(2).await.unwrap().is_some());
        assert!(inventory.find_product(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_edit_approval_leaves_request_pending() {
        let store = InMemoryStore::new();
        let entry = store
            .insert_entry(&NewStockCount {
                product_id: 1,
                stock_date: date("2025-01-10"),
                manual_packs: 50,
                system_packs: 47,
                notes: None,
                submitted_by: 10,
            })
            .await
            .unwrap();
        store
            .review_entry(
                entry.id,
                &EntryDecision::Approve {
                    reviewer: 20,
                    admin_notes: None,
                },
            )
            .await
            .unwrap();
        let request = store
            .insert_edit_request(&NewEditRequest {
                stock_count_entry_id: entry.id,
                new_manual_packs: 48,
                edit_reason: "recount after damage found".into(),
                requested_by: 10,
            })
            .await
            .unwrap();

        // Simulate the entry drifting away from the request's snapshot.
        store
            .state
            .lock()
            .await
            .entries
            .get_mut(&entry.id)
            .unwrap()
            .set_manual_packs(49);

        let result = store.approve_edit_request(request.id, 20).await;
        assert!(matches!(result, Err(CoreError::InvalidState(_))));

        let request = store.find_edit_request(request.id).await.unwrap().unwrap();
        assert_eq!(request.status, ReviewStatus::Pending);
        let entry = store.find_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(entry.manual_packs, 49);
    }
}
