use akaun_core::{filter_products, sort_products, Product, SortKey};

const NAME_WIDTH: usize = 36;

/// Print the storefront view of the catalog as a table.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_products_list(
    pool: &sqlx::PgPool,
    query: &str,
    category: &str,
    stock: &str,
    sort: Option<SortKey>,
) -> anyhow::Result<()> {
    let snapshot = akaun_db::list_products(pool).await?;
    let mut products = filter_products(&snapshot, query, category, stock);
    if let Some(key) = sort {
        products = sort_products(&products, key);
    }

    if products.is_empty() {
        println!("no products match; run `db seed` to load a catalog");
        return Ok(());
    }

    println!(
        "{:<6}{:<w$}{:<9}{:<12}{:<10}{:>12}",
        "ID",
        "NAME",
        "CATEGORY",
        "GAME",
        "STOCK",
        "PRICE",
        w = NAME_WIDTH
    );
    for product in &products {
        println!("{}", format_row(product));
    }
    println!("{} product(s)", products.len());

    Ok(())
}

fn format_row(product: &Product) -> String {
    let name = if product.name.chars().count() > NAME_WIDTH - 2 {
        format!(
            "{}...",
            product.name.chars().take(NAME_WIDTH - 5).collect::<String>()
        )
    } else {
        product.name.clone()
    };

    format!(
        "{:<6}{:<w$}{:<9}{:<12}{:<10}{:>12}",
        product.id,
        name,
        product.category.as_str(),
        product.game.as_deref().unwrap_or("-"),
        product.stock.as_str(),
        product.price.round_dp(2).to_string(),
        w = NAME_WIDTH
    )
}
