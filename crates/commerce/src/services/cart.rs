//! Cart/order lifecycle service.
//!
//! A user has at most one active cart; ordering is an atomic, guarded
//! transition out of `active`. Pricing is computed from live product data on
//! every read (see [`crate::pricing`]).

use sqlx::SqlitePool;

use marigold_core::{CartId, ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{CommerceError, Result};
use crate::models::Cart;
use crate::pricing::{self, PricedCart};

/// Outcome of the checkout read path.
///
/// An empty cart is a user-visible state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Checkout {
    /// No active cart, or an active cart with zero items.
    Empty,
    /// An active cart priced from live product data.
    Ready { cart: Cart, priced: PricedCart },
}

/// Service for the cart lifecycle and checkout reads.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// The user's single active cart, if any.
    ///
    /// # Errors
    ///
    /// Returns a wrapped repository error if the query fails.
    pub async fn active_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self.carts.active_for_user(user_id).await?)
    }

    /// Get the user's active cart, creating one if none exists.
    ///
    /// The partial unique index enforces one active cart per user; losing
    /// the creation race to a concurrent request falls back to the winner's
    /// cart.
    ///
    /// # Errors
    ///
    /// Returns a wrapped repository error if the store fails.
    pub async fn get_or_create_active_cart(&self, user_id: UserId) -> Result<Cart> {
        if let Some(cart) = self.carts.active_for_user(user_id).await? {
            return Ok(cart);
        }

        match self.carts.create_active(user_id).await {
            Ok(cart) => Ok(cart),
            Err(RepositoryError::Conflict(_)) => {
                let cart = self
                    .carts
                    .active_for_user(user_id)
                    .await?
                    .ok_or(CommerceError::NotFound("cart"))?;
                Ok(cart)
            }
            Err(other) => Err(log_repository(other)),
        }
    }

    /// Add a product to the user's active cart, accumulating quantity.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive quantity and `NotFound` for a
    /// missing product.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Cart> {
        validate_quantity(quantity)?;

        if self.products.get_by_id(product_id).await?.is_none() {
            return Err(CommerceError::NotFound("product"));
        }

        let cart = self.get_or_create_active_cart(user_id).await?;
        self.carts
            .upsert_item(cart.id, product_id, quantity)
            .await
            .map_err(log_repository)?;

        tracing::debug!(%user_id, %product_id, quantity, cart_id = %cart.id, "item added to cart");

        Ok(cart)
    }

    /// Replace the quantity of a line in the user's active cart.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive quantity and `NotFound` when
    /// there is no active cart or no such line.
    pub async fn set_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<()> {
        validate_quantity(quantity)?;

        let cart = self
            .carts
            .active_for_user(user_id)
            .await?
            .ok_or(CommerceError::NotFound("cart"))?;

        self.carts
            .set_item_quantity(cart.id, product_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CommerceError::NotFound("cart item"),
                other => log_repository(other),
            })
    }

    /// Remove a product from the user's active cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when there is no active cart or no such line.
    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<()> {
        let cart = self
            .carts
            .active_for_user(user_id)
            .await?
            .ok_or(CommerceError::NotFound("cart"))?;

        let removed = self
            .carts
            .remove_item(cart.id, product_id)
            .await
            .map_err(log_repository)?;

        if removed {
            Ok(())
        } else {
            Err(CommerceError::NotFound("cart item"))
        }
    }

    /// Checkout read path: the active cart priced live, or `Empty`.
    ///
    /// # Errors
    ///
    /// Returns a wrapped repository error if a query fails.
    pub async fn checkout(&self, user_id: UserId) -> Result<Checkout> {
        let Some(cart) = self.carts.active_for_user(user_id).await? else {
            return Ok(Checkout::Empty);
        };

        let lines = self.carts.lines(cart.id).await.map_err(log_repository)?;
        if lines.is_empty() {
            return Ok(Checkout::Empty);
        }

        Ok(Checkout::Ready {
            cart,
            priced: pricing::price_cart(&lines),
        })
    }

    /// Transition a cart from `active` to `ordered`.
    ///
    /// Fails loudly when the cart is not currently active, so a double
    /// submission cannot order the same cart twice.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing cart and `CartNotActive` for a cart
    /// in any other state.
    pub async fn order_cart(&self, cart_id: CartId) -> Result<()> {
        self.carts.order(cart_id).await.map_err(|e| match e {
            RepositoryError::NotFound => CommerceError::NotFound("cart"),
            RepositoryError::Conflict(_) => CommerceError::CartNotActive,
            other => log_repository(other),
        })?;

        tracing::info!(%cart_id, "cart ordered");

        Ok(())
    }
}

fn validate_quantity(quantity: i64) -> Result<()> {
    if quantity < 1 {
        return Err(CommerceError::Validation(
            "quantity must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

/// Log a repository failure and pass it through wrapped.
fn log_repository(err: RepositoryError) -> CommerceError {
    tracing::error!(error = %err, "repository error in cart service");
    CommerceError::Repository(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }
}
