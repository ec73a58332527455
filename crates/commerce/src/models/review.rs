//! Product review record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::{ProductId, ReviewId, UserId};

/// A customer review of a product.
///
/// At most one review exists per (product, user) pair; `helpful_count` is a
/// derived counter mutated only through the helpful-vote path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: f64,
    pub body: String,
    pub helpful_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
