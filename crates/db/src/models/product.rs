//! Product catalog rows and inventory movement inputs.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::FromRow;
use stockrecon_core::stock_count::Product;
use stockrecon_core::types::DbId;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: DbId,
    pub product_no: String,
    pub name: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            product_no: row.product_no,
        }
    }
}

/// DTO for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub product_no: String,
    pub name: String,
}

/// DTO for recording a stock movement. `quantity_packs` is signed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovement {
    pub product_id: DbId,
    pub movement_date: NaiveDate,
    pub quantity_packs: i64,
    pub movement_type: String,
    pub reference: Option<String>,
}
