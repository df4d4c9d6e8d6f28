//! Repository for the `products` table.

use sqlx::PgPool;
use stockrecon_core::types::DbId;

use crate::models::product::{CreateProduct, ProductRow};

const COLUMNS: &str = "id, product_no, name";

pub struct ProductRepo;

impl ProductRepo {
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<ProductRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (product_no, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(&input.product_no)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Active products ordered by product number.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<ProductRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products WHERE is_active = true ORDER BY product_no ASC"
        );
        sqlx::query_as::<_, ProductRow>(&query).fetch_all(pool).await
    }

    /// Find an active product by id.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<ProductRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM products WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
