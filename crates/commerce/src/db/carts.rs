//! Cart repository for database operations.

use chrono::Utc;
use sqlx::SqlitePool;

use marigold_core::{CartId, CartItemId, CartStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::Cart;

const CART_COLUMNS: &str = "id, user_id, status, created_at, updated_at";

/// A cart item joined with the live product fields pricing needs.
///
/// Prices are never snapshotted at add-to-cart time; this row is the
/// read-time join of `cart_item` with `product`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price_cents: i64,
    pub discount_percent: i64,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a cart by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(&format!(
            "SELECT {CART_COLUMNS} FROM cart WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(cart)
    }

    /// Get the user's single active cart, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(&format!(
            "SELECT {CART_COLUMNS} FROM cart WHERE user_id = ? AND status = 'active'"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(cart)
    }

    /// Create an active cart for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has an active
    /// cart (partial unique index). Returns `RepositoryError::Database` for
    /// other failures.
    pub async fn create_active(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let now = Utc::now();

        let cart = sqlx::query_as::<_, Cart>(&format!(
            "INSERT INTO cart (user_id, status, created_at, updated_at) \
             VALUES (?, 'active', ?, ?) \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("user already has an active cart".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(cart)
    }

    /// List a cart's lines joined with live product data, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT ci.id AS item_id, ci.product_id, p.name AS product_name, \
                    ci.quantity, p.price_cents, p.discount_percent \
             FROM cart_item ci \
             JOIN product p ON p.id = ci.product_id \
             WHERE ci.cart_id = ? \
             ORDER BY ci.created_at ASC, ci.id ASC",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }

    /// Add a product to a cart, accumulating quantity on repeat adds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails (including a
    /// missing product, via the foreign key).
    pub async fn upsert_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cart_item (cart_id, product_id, quantity, created_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = quantity + excluded.quantity",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Replace the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart has no such line.
    pub async fn set_item_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE cart_item SET quantity = ? WHERE cart_id = ? AND product_id = ?")
                .bind(quantity)
                .bind(cart_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove a product from a cart.
    ///
    /// Returns `true` if a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE cart_id = ? AND product_id = ?")
            .bind(cart_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition a cart from `active` to `ordered`.
    ///
    /// The update is guarded on the current status, so a cart that has
    /// already been ordered (or is in any later state) fails loudly instead
    /// of transitioning twice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart doesn't exist.
    /// Returns `RepositoryError::Conflict` if it exists but is not active.
    pub async fn order(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart SET status = 'ordered', updated_at = ? \
             WHERE id = ? AND status = 'active'",
        )
        .bind(Utc::now())
        .bind(cart_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let status: Option<CartStatus> =
                sqlx::query_scalar("SELECT status FROM cart WHERE id = ?")
                    .bind(cart_id)
                    .fetch_optional(self.pool)
                    .await?;

            return match status {
                None => Err(RepositoryError::NotFound),
                Some(status) => Err(RepositoryError::Conflict(format!(
                    "cart is {status}, not active"
                ))),
            };
        }

        Ok(())
    }
}
