use akaun_core::ProductInput;
use sqlx::PgPool;

use crate::DbError;

/// Insert catalog products from a seed file.
///
/// Returns the number of products inserted. All inserts run inside a single
/// transaction; if any insert fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_products(pool: &PgPool, products: &[ProductInput]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for product in products {
        sqlx::query(
            "INSERT INTO products \
                 (name, category, game, stock, level, server, hero_count, rank, price, image, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&product.name)
        .bind(product.category.as_str())
        .bind(&product.game)
        .bind(product.stock.as_str())
        .bind(product.level)
        .bind(&product.server)
        .bind(product.hero_count)
        .bind(&product.rank)
        .bind(product.price)
        .bind(&product.image)
        .bind(&product.description)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    tracing::info!(count, "seeded products");
    Ok(count)
}
