//! Domain core for manual stock count reconciliation.
//!
//! Holds the entity types, validation rules, the shared review state
//! machine and the workflow engine. Storage and the inventory/catalog
//! collaborators are reached through the traits in [`ports`], so this
//! crate has no database or HTTP dependencies.

pub mod edit_request;
pub mod error;
pub mod memory;
pub mod pagination;
pub mod ports;
pub mod roles;
pub mod status;
pub mod stock_count;
pub mod types;
pub mod workflow;
