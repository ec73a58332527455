//! Read-time cart pricing.
//!
//! Totals are recomputed from live product rows on every read; nothing is
//! snapshotted at add-to-cart time, so a price or discount change before
//! order placement changes what the customer sees. All arithmetic is decimal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{Money, ProductId};

use crate::db::CartLine;

/// Subtotal at or above this ships free.
pub const FREE_SHIPPING_THRESHOLD_CENTS: i64 = 5_000;

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE_CENTS: i64 = 500;

/// One cart line priced from live product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    /// List price with the product discount applied.
    pub unit_price: Money,
    pub line_total: Money,
}

/// Totals for a priced cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

/// A fully priced cart ready for checkout display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub totals: CartTotals,
}

/// Effective unit price: `price x (1 - discount/100)`.
#[must_use]
pub fn effective_unit_price(price_cents: i64, discount_percent: i64) -> Money {
    let price = Money::from_cents(price_cents).amount();
    let keep = Decimal::from(100 - discount_percent) / Decimal::from(100);
    Money::new(price * keep)
}

/// Shipping cost for a subtotal.
#[must_use]
pub fn shipping_for(subtotal: Money) -> Money {
    if subtotal >= Money::from_cents(FREE_SHIPPING_THRESHOLD_CENTS) {
        Money::ZERO
    } else {
        Money::from_cents(FLAT_SHIPPING_FEE_CENTS)
    }
}

/// Price a cart's lines and compute its totals.
#[must_use]
pub fn price_cart(lines: &[CartLine]) -> PricedCart {
    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal = Money::ZERO;

    for line in lines {
        let unit_price = effective_unit_price(line.price_cents, line.discount_percent);
        let line_total = unit_price * line.quantity;
        subtotal += line_total;

        priced.push(PricedLine {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price,
            line_total,
        });
    }

    let shipping = shipping_for(subtotal);

    PricedCart {
        lines: priced,
        totals: CartTotals {
            subtotal,
            shipping,
            total: subtotal + shipping,
        },
    }
}
