//! Shared helpers for commerce integration tests.
//!
//! Tests run against an in-memory `SQLite` database with the real migrations
//! applied. The pool is capped at one connection so every statement sees the
//! same in-memory database.

#![allow(dead_code)]

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use marigold_commerce::db::{self, ProductRepository, UserRepository};
use marigold_commerce::models::{NewAddress, Product, User};
use marigold_core::{AddressKind, UserRole};

/// Fresh in-memory database with the schema applied.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid connection string")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect to in-memory sqlite");

    db::MIGRATOR.run(&pool).await.expect("run migrations");

    pool
}

/// Create a customer account.
pub async fn create_user(pool: &SqlitePool, email: &str) -> User {
    UserRepository::new(pool)
        .create("Test Customer", email, UserRole::Customer)
        .await
        .expect("create user")
}

/// Create a product with the given list price and discount.
pub async fn create_product(pool: &SqlitePool, price_cents: i64, discount_percent: i64) -> Product {
    ProductRepository::new(pool)
        .create("Test Product", price_cents, discount_percent, 100)
        .await
        .expect("create product")
}

/// Re-read a product row.
pub async fn reload_product(pool: &SqlitePool, product: &Product) -> Product {
    ProductRepository::new(pool)
        .get_by_id(product.id)
        .await
        .expect("load product")
        .expect("product exists")
}

/// Re-read a user row.
pub async fn reload_user(pool: &SqlitePool, user: &User) -> User {
    UserRepository::new(pool)
        .get_by_id(user.id)
        .await
        .expect("load user")
        .expect("user exists")
}

/// A plausible shipping address.
pub fn sample_address(line1: &str) -> NewAddress {
    NewAddress {
        line1: line1.to_owned(),
        line2: None,
        city: "Portland".to_owned(),
        region: "OR".to_owned(),
        postal_code: "97201".to_owned(),
        country: "US".to_owned(),
        kind: AddressKind::Home,
    }
}
