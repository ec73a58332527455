//! Marigold Commerce - business-rule services for the storefront.
//!
//! This crate is the state-transition and invariant-maintenance core of the
//! store. It owns three concerns, each a service over the shared relational
//! store:
//!
//! - [`services::ReviewService`] - review writes, the cached product rating
//!   aggregate, and helpful-vote idempotency
//! - [`services::AddressService`] - the at-most-one default address
//!   invariant, including re-election on delete
//! - [`services::CartService`] - the single active cart per user, live
//!   checkout pricing, and the guarded active-to-ordered transition
//!
//! The presentation and query layer (pages, filter forms, admin tables)
//! lives outside this crate and consumes the services through plain function
//! calls. Caller identity comes in explicitly as an [`auth::Caller`]; stale
//! page signals go out through the [`revalidate::Revalidator`] seam.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pricing;
pub mod revalidate;
pub mod services;

pub use auth::Caller;
pub use config::{CommerceConfig, ConfigError};
pub use error::{CommerceError, Result};
pub use revalidate::{NoopRevalidator, Revalidator};
pub use services::{AddressService, CartService, Checkout, ReviewPatch, ReviewService};
