//! # Route Handlers
//!
//! - [`checkout`] - Price a basket
//! - [`products`] - Catalog CRUD and discount rules
//! - [`health`] - Liveness and database reachability

pub mod checkout;
pub mod health;
pub mod products;
