use std::sync::Arc;

use chrono::NaiveDate;
use stockrecon_core::workflow::ReconciliationService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The reconciliation workflow, wired to its store and inventory.
    pub service: Arc<ReconciliationService>,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// The current business date (UTC).
    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}
