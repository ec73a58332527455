//! Cart and cart-item records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::{CartId, CartItemId, CartStatus, ProductId, UserId};

/// A shopping cart.
///
/// At most one cart per user carries `status = active`; a partial unique
/// index in the schema enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line in a cart.
///
/// No price snapshot is taken here; pricing reads live product data at
/// checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}
