//! Domain models backed by the commerce schema.
//!
//! These are row-shaped structs decoded straight from SQLite via
//! `sqlx::FromRow`; derived fields (`product.rating`, `review.helpful_count`,
//! `user.default_address_id`) are only ever written by their owning service.

pub mod address;
pub mod cart;
pub mod product;
pub mod review;
pub mod user;

pub use address::{Address, NewAddress};
pub use cart::{Cart, CartItem};
pub use product::Product;
pub use review::Review;
pub use user::User;
