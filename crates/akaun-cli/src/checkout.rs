use akaun_core::{build_checkout, whatsapp_link, AppConfig, CartItem};

/// Parse `<id>` or `<id>:<qty>` into a cart line.
pub(crate) fn parse_cart_item(raw: &str) -> Result<CartItem, String> {
    let (id, quantity) = match raw.split_once(':') {
        Some((id, qty)) => (id, Some(qty)),
        None => (raw, None),
    };

    let product_id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid product id '{id}'"))?;
    let quantity = quantity
        .map(|q| {
            q.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid quantity '{q}'"))
        })
        .transpose()?;

    Ok(CartItem {
        product_id,
        quantity,
    })
}

/// Price the cart against the database and print the order summary.
///
/// # Errors
///
/// Returns an error if `AKAUN_WHATSAPP_RECIPIENT` is unset, the cart is
/// empty, or the database query fails.
pub(crate) async fn run_checkout(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    items: &[CartItem],
    name: &str,
    contact: &str,
) -> anyhow::Result<()> {
    let recipient = config.whatsapp_recipient()?;
    let ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
    let quotes = akaun_db::get_product_quotes(pool, &ids).await?;

    let format = config.message_format();
    let summary = build_checkout(items, |id| quotes.get(&id).cloned(), name, contact, &format)?;

    for line in &summary.lines {
        println!(
            "{:<6}{:<36}x{:<4}{} {}",
            line.product_id,
            line.name.as_deref().unwrap_or("(not found)"),
            line.quantity,
            format.currency_label,
            line.subtotal.round_dp(2),
        );
    }
    if !summary.unresolved.is_empty() {
        tracing::warn!(unresolved = ?summary.unresolved, "cart references unknown products");
    }

    println!(
        "Total: {} {}",
        format.currency_label,
        summary.total_amount.round_dp(2)
    );
    println!(
        "{}",
        whatsapp_link(&config.whatsapp_base_url, recipient, &summary.message)
    );

    Ok(())
}
