//! Storefront filtering and admin sorting over an in-memory product snapshot.
//!
//! Everything here is a pure function of its arguments: the snapshot is
//! borrowed, never mutated, and the result is a fresh `Vec`.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Product, ValidationError};

/// Tag value that disables the category or stock predicate.
pub const ALL: &str = "all";

/// Field the admin product list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Price,
    Description,
    Date,
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "price" => Ok(SortKey::Price),
            "description" => Ok(SortKey::Description),
            "date" => Ok(SortKey::Date),
            other => Err(ValidationError::new(
                "sort",
                format!("must be one of name, price, description, date; got '{other}'"),
            )),
        }
    }
}

/// Storefront filter.
///
/// - `query` matches name or server, case-insensitively; empty matches all.
/// - `category` matches the product's category name or its game tag.
/// - `stock` matches the stock status.
///
/// `"all"` (or an empty string) disables the category/stock predicates.
/// Relative order of the snapshot is preserved.
#[must_use]
pub fn filter_products(
    products: &[Product],
    query: &str,
    category: &str,
    stock: &str,
) -> Vec<Product> {
    let needle = query.to_lowercase();

    products
        .iter()
        .filter(|p| matches_query(p, &needle))
        .filter(|p| matches_category(p, category))
        .filter(|p| matches_stock(p, stock))
        .cloned()
        .collect()
}

/// Admin dashboard search: name or description contains `term`, ignoring case.
#[must_use]
pub fn search_admin(products: &[Product], term: &str) -> Vec<Product> {
    let needle = term.to_lowercase();

    products
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Stable sort of a copy of `products` by `key`, ascending.
///
/// A missing description sorts as `""`; a missing `created_at` sorts as the
/// Unix epoch.
#[must_use]
pub fn sort_products(products: &[Product], key: SortKey) -> Vec<Product> {
    let mut sorted = products.to_vec();
    sorted.sort_by(|a, b| compare_by(a, b, key));
    sorted
}

/// Comparator used by [`sort_products`], exposed so callers can check ordering.
#[must_use]
pub fn compare_by(a: &Product, b: &Product, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => compare_text(&a.name, &b.name),
        SortKey::Price => a.price.cmp(&b.price),
        SortKey::Description => compare_text(
            a.description.as_deref().unwrap_or_default(),
            b.description.as_deref().unwrap_or_default(),
        ),
        SortKey::Date => created_or_epoch(a).cmp(&created_or_epoch(b)),
    }
}

fn matches_query(product: &Product, needle: &str) -> bool {
    needle.is_empty()
        || product.name.to_lowercase().contains(needle)
        || product
            .server
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

fn matches_category(product: &Product, category: &str) -> bool {
    is_wildcard(category)
        || product.category.as_str() == category
        || product.game.as_deref() == Some(category)
}

fn matches_stock(product: &Product, stock: &str) -> bool {
    is_wildcard(stock) || product.stock.as_str() == stock
}

fn is_wildcard(tag: &str) -> bool {
    tag.is_empty() || tag == ALL
}

fn created_or_epoch(product: &Product) -> DateTime<Utc> {
    product.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Case-folded comparison; on a tie, lowercase sorts before uppercase.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.chars().map(swap_ascii_case).cmp(b.chars().map(swap_ascii_case)))
}

fn swap_ascii_case(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c.to_ascii_uppercase()
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
