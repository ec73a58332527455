//! Product catalog record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::{Money, ProductId};

/// A catalog product.
///
/// `rating` is a cached aggregate: the arithmetic mean of all review ratings
/// for this product, rounded to one decimal. The review service recomputes it
/// on every review write; nothing else touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price_cents: i64,
    pub discount_percent: i64,
    pub stock: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// List price before any discount.
    #[must_use]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}
