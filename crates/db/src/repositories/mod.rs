//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return raw rows.

pub mod edit_request_repo;
pub mod inventory_repo;
pub mod product_repo;
pub mod stock_count_repo;

pub use edit_request_repo::{EditApproval, EditRequestInsert, EditRequestRepo};
pub use inventory_repo::InventoryRepo;
pub use product_repo::ProductRepo;
pub use stock_count_repo::StockCountRepo;
