//! Business-rule services over the commerce store.
//!
//! Each service wraps the repositories it needs and enforces the invariants
//! the presentation layer relies on: review/rating consistency, the single
//! default address, and the cart lifecycle.

pub mod addresses;
pub mod cart;
pub mod reviews;

pub use addresses::AddressService;
pub use cart::{CartService, Checkout};
pub use reviews::{ReviewPatch, ReviewService};
