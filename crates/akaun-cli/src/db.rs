use std::path::Path;

/// Check database connectivity.
///
/// # Errors
///
/// Returns an error if the database cannot be reached.
pub(crate) async fn run_db_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    akaun_db::health_check(pool).await?;
    println!("database ok");
    Ok(())
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub(crate) async fn run_db_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = akaun_db::run_migrations(pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Validate a YAML seed file and insert every product in one transaction.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or if any insert fails.
pub(crate) async fn run_db_seed(pool: &sqlx::PgPool, file: &Path) -> anyhow::Result<()> {
    let products = akaun_core::load_seed_file(file)?;
    if products.is_empty() {
        println!("{} has no products; nothing to seed", file.display());
        return Ok(());
    }

    let count = akaun_db::seed_products(pool, &products).await?;
    println!("seeded {count} products from {}", file.display());
    Ok(())
}
