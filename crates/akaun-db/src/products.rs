//! Database operations for the `products` table.

use std::collections::HashMap;

use akaun_core::{Category, Product, ProductInput, ProductQuote, StockStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

const PRODUCT_COLUMNS: &str = "id, name, category, game, stock, level, server, hero_count, rank, \
                               price, image, description, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `products` table.
///
/// `category` and `stock` are stored as text guarded by `CHECK` constraints;
/// conversion to [`Product`] parses them back into the domain enums.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub game: Option<String>,
    pub stock: String,
    pub level: Option<i32>,
    pub server: Option<String>,
    pub hero_count: Option<i32>,
    pub rank: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let invalid = |reason: String| DbError::InvalidRow {
            table: "products",
            id: row.id,
            reason,
        };
        let category = row
            .category
            .parse::<Category>()
            .map_err(|e| invalid(format!("{e}")))?;
        let stock = row
            .stock
            .parse::<StockStatus>()
            .map_err(|e| invalid(format!("{e}")))?;

        Ok(Product {
            id: row.id,
            name: row.name,
            category,
            game: row.game,
            stock,
            level: row.level,
            server: row.server,
            hero_count: row.hero_count,
            rank: row.rank,
            price: row.price,
            image: row.image,
            description: row.description,
            created_at: Some(row.created_at),
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, DbError> {
    rows.into_iter().map(Product::try_from).collect()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every product, ordered by `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// if a stored category/stock value is unknown.
pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    into_products(rows)
}

/// Returns a single product by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<Option<Product>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Product::try_from).transpose()
}

/// Resolves product ids to their name and price for checkout.
///
/// Ids with no matching row are simply absent from the map.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_quotes(
    pool: &PgPool,
    ids: &[i64],
) -> Result<HashMap<i64, ProductQuote>, DbError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (i64, String, Decimal)>(
        "SELECT id, name, price FROM products WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, price)| (id, ProductQuote { name, price }))
        .collect())
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a product and returns the stored row.
///
/// The caller is expected to pass input through [`ProductInput::normalized`]
/// first; the table's `CHECK` constraints are the last line of defence.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_product(pool: &PgPool, input: &ProductInput) -> Result<Product, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products \
             (name, category, game, stock, level, server, hero_count, rank, price, image, description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(input.category.as_str())
    .bind(&input.game)
    .bind(input.stock.as_str())
    .bind(input.level)
    .bind(&input.server)
    .bind(input.hero_count)
    .bind(&input.rank)
    .bind(input.price)
    .bind(&input.image)
    .bind(&input.description)
    .fetch_one(pool)
    .await?;

    Product::try_from(row)
}

/// Replaces every editable field of a product.
///
/// Returns `None` when no product has `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_product(
    pool: &PgPool,
    id: i64,
    input: &ProductInput,
) -> Result<Option<Product>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE products \
         SET name        = $2, \
             category    = $3, \
             game        = $4, \
             stock       = $5, \
             level       = $6, \
             server      = $7, \
             hero_count  = $8, \
             rank        = $9, \
             price       = $10, \
             image       = $11, \
             description = $12, \
             updated_at  = NOW() \
         WHERE id = $1 \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.name)
    .bind(input.category.as_str())
    .bind(&input.game)
    .bind(input.stock.as_str())
    .bind(input.level)
    .bind(&input.server)
    .bind(input.hero_count)
    .bind(&input.rank)
    .bind(input.price)
    .bind(&input.image)
    .bind(&input.description)
    .fetch_optional(pool)
    .await?;

    row.map(Product::try_from).transpose()
}

/// Hard-deletes a product. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_product(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
