//! Order summary construction for the messaging deep-link checkout.
//!
//! There is no server-side order: checkout produces a total and a
//! percent-encoded text message that the customer sends to the shop admin
//! through a `wa.me` link.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

pub const DEFAULT_CURRENCY_LABEL: &str = "RM";

/// One cart line as submitted by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl CartItem {
    #[must_use]
    pub fn new(product_id: i64, quantity: u32) -> Self {
        Self {
            product_id,
            quantity: Some(quantity),
        }
    }

    /// Quantity used for pricing. Absent or zero counts as one.
    #[must_use]
    pub fn effective_quantity(&self) -> u32 {
        match self.quantity {
            Some(q) if q > 0 => q,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub customer_name: String,
    pub customer_contact: String,
}

/// Name and unit price of a product, as resolved for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuote {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutLine {
    pub product_id: i64,
    /// `None` when the product could not be resolved.
    pub name: Option<String>,
    pub quantity: u32,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub total_amount: Decimal,
    /// Percent-encoded, ready to drop into a `text=` query parameter.
    pub message: String,
    pub lines: Vec<CheckoutLine>,
    /// Product ids that the lookup did not resolve; their subtotal is zero.
    pub unresolved: Vec<i64>,
}

/// Presentation knobs for the order message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFormat {
    pub currency_label: String,
}

impl Default for MessageFormat {
    fn default() -> Self {
        Self {
            currency_label: DEFAULT_CURRENCY_LABEL.to_string(),
        }
    }
}

/// Price a cart and render the order message.
///
/// `lookup` resolves a product id to its name and unit price. Ids it cannot
/// resolve contribute a zero subtotal and are listed in
/// [`CheckoutSummary::unresolved`]; they never abort the build.
///
/// # Errors
///
/// Returns [`ValidationError`] on the `items` field when the cart is empty
/// or a subtotal or the total does not fit in a [`Decimal`].
pub fn build_checkout<F>(
    items: &[CartItem],
    lookup: F,
    customer_name: &str,
    customer_contact: &str,
    format: &MessageFormat,
) -> Result<CheckoutSummary, ValidationError>
where
    F: Fn(i64) -> Option<ProductQuote>,
{
    if items.is_empty() {
        return Err(ValidationError::new(
            "items",
            "cart must contain at least one item",
        ));
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut unresolved = Vec::new();

    for item in items {
        let quantity = item.effective_quantity();
        let line = match lookup(item.product_id) {
            Some(quote) => CheckoutLine {
                product_id: item.product_id,
                subtotal: quote
                    .price
                    .checked_mul(Decimal::from(quantity))
                    .ok_or_else(|| amount_overflow(item.product_id))?,
                name: Some(quote.name),
                quantity,
            },
            None => {
                unresolved.push(item.product_id);
                CheckoutLine {
                    product_id: item.product_id,
                    name: None,
                    quantity,
                    subtotal: Decimal::ZERO,
                }
            }
        };
        lines.push(line);
    }

    let total_amount = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.subtotal))
        .ok_or_else(|| ValidationError::new("items", "cart total is too large"))?;
    let text = render_message(&lines, total_amount, customer_name, customer_contact, format);

    Ok(CheckoutSummary {
        total_amount,
        message: encode_message(&text),
        lines,
        unresolved,
    })
}

fn amount_overflow(product_id: i64) -> ValidationError {
    ValidationError::new(
        "items",
        format!("subtotal for product {product_id} is too large"),
    )
}

/// Plain-text order message, one fact per line.
#[must_use]
pub fn render_message(
    lines: &[CheckoutLine],
    total_amount: Decimal,
    customer_name: &str,
    customer_contact: &str,
    format: &MessageFormat,
) -> String {
    let currency = &format.currency_label;
    let mut text = String::from("Halo Admin!\nSaya ingin melakukan pembelian:\n");

    for (i, line) in lines.iter().enumerate() {
        let name = line
            .name
            .clone()
            .unwrap_or_else(|| format!("Produk #{} (tidak dijumpai)", line.product_id));
        text.push_str(&format!(
            "{}. {name} x{} = {currency} {}\n",
            i + 1,
            line.quantity,
            display_amount(line.subtotal),
        ));
    }

    text.push_str(&format!(
        "Total: {currency} {}\n",
        display_amount(total_amount)
    ));
    text.push_str(&format!("Nama: {customer_name}\n"));
    text.push_str(&format!("WA: {customer_contact}\n"));
    text.push_str("Terima kasih!");
    text
}

#[must_use]
pub fn encode_message(text: &str) -> String {
    utf8_percent_encode(text, NON_ALPHANUMERIC).to_string()
}

/// `https://wa.me/<recipient>?text=<encoded>`; a leading `+` on the recipient is dropped.
#[must_use]
pub fn whatsapp_link(base_url: &str, recipient: &str, encoded_message: &str) -> String {
    format!(
        "{}/{}?text={encoded_message}",
        base_url.trim_end_matches('/'),
        recipient.trim().trim_start_matches('+'),
    )
}

/// Amounts print without trailing zeros: `20`, `12.5`.
fn display_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}
