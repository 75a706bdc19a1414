use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_NAME_LEN: usize = 200;

/// Largest value a `NUMERIC(12, 2)` price column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);
/// Decimal places kept by the price column.
pub const PRICE_SCALE: u32 = 2;

/// Top-level listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Game,
    Gadget,
    Sosmed,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Game => "game",
            Category::Gadget => "gadget",
            Category::Sosmed => "sosmed",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "game" => Ok(Category::Game),
            "gadget" => Ok(Category::Gadget),
            "sosmed" => Ok(Category::Sosmed),
            other => Err(ValidationError::new(
                "category",
                format!("must be 'game', 'gadget' or 'sosmed', got '{other}'"),
            )),
        }
    }
}

/// Whether a listing ships immediately or has to be ordered in advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Ready,
    Preorder,
}

impl StockStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::Ready => "ready",
            StockStatus::Preorder => "preorder",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(StockStatus::Ready),
            "preorder" => Ok(StockStatus::Preorder),
            other => Err(ValidationError::new(
                "stock",
                format!("must be 'ready' or 'preorder', got '{other}'"),
            )),
        }
    }
}

/// A sellable listing: a game or social-media account, or a gadget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Assigned by the database; never changes once issued.
    pub id: i64,
    pub name: String,
    pub category: Category,
    /// Free-form sub-category such as `"tiktok"` or `"mlbb"`.
    pub game: Option<String>,
    pub stock: StockStatus,
    pub level: Option<i32>,
    /// Server or region text, e.g. `"Asia"`.
    pub server: Option<String>,
    pub hero_count: Option<i32>,
    pub rank: Option<String>,
    /// Always `>= 0`; enforced on write and by a table constraint.
    pub price: Decimal,
    /// Public image URL.
    pub image: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Editable product fields, as submitted by the admin form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub game: Option<String>,
    pub stock: StockStatus,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub hero_count: Option<i32>,
    #[serde(default)]
    pub rank: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProductInput {
    /// Trim text fields, drop blank optionals, and check the write invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the first offending field.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::new(
                "name",
                format!("must be 1-{MAX_NAME_LEN} characters"),
            ));
        }
        if self.price < Decimal::ZERO {
            return Err(ValidationError::new(
                "price",
                format!("must not be negative, got {}", self.price),
            ));
        }
        if self.price > MAX_PRICE {
            return Err(ValidationError::new(
                "price",
                format!("must not exceed {MAX_PRICE}, got {}", self.price),
            ));
        }
        if self.price.normalize().scale() > PRICE_SCALE {
            return Err(ValidationError::new(
                "price",
                format!("must have at most {PRICE_SCALE} decimal places, got {}", self.price),
            ));
        }
        if let Some(level) = self.level.filter(|v| *v < 0) {
            return Err(ValidationError::new(
                "level",
                format!("must not be negative, got {level}"),
            ));
        }
        if let Some(count) = self.hero_count.filter(|v| *v < 0) {
            return Err(ValidationError::new(
                "hero_count",
                format!("must not be negative, got {count}"),
            ));
        }

        Ok(Self {
            name,
            game: non_blank(self.game),
            server: non_blank(self.server),
            rank: non_blank(self.rank),
            image: non_blank(self.image),
            description: non_blank(self.description),
            ..self
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
