//! Repository for the `inventory_movements` ledger.

use chrono::NaiveDate;
use sqlx::PgPool;
use stockrecon_core::types::DbId;

use crate::models::product::CreateMovement;

pub struct InventoryRepo;

impl InventoryRepo {
    /// Record a signed stock movement, returning its id.
    pub async fn record_movement(pool: &PgPool, input: &CreateMovement) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO inventory_movements
                (product_id, movement_date, quantity_packs, movement_type, reference)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(input.product_id)
        .bind(input.movement_date)
        .bind(input.quantity_packs)
        .bind(&input.movement_type)
        .bind(&input.reference)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Pack balance for a product at the end of `as_of`: the sum of every
    /// movement dated on or before it.
    pub async fn system_packs(
        pool: &PgPool,
        product_id: DbId,
        as_of: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let balance: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity_packs), 0)::BIGINT
             FROM inventory_movements
             WHERE product_id = $1 AND movement_date <= $2",
        )
        .bind(product_id)
        .bind(as_of)
        .fetch_one(pool)
        .await?;
        Ok(balance.0)
    }
}
