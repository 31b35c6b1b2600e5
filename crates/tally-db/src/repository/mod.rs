//! # Repository Module
//!
//! Database repository implementations for the Tally catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Repositories                                 │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().get_by_code("A")                                │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list / get_by_code / get_many_by_codes                           │
//! │  ├── insert / update / delete                                          │
//! │  └── count                                                             │
//! │       │                                                                 │
//! │       │  rules attached on read                                        │
//! │       ▼                                                                 │
//! │  DiscountRuleRepository                                                │
//! │  ├── list_for_product / list_for_products                             │
//! │  └── insert / delete by (code, quantity)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (products, discount_rules)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and batch lookup
//! - [`DiscountRuleRepository`](discount::DiscountRuleRepository) - Bulk-discount rules

pub mod discount;
pub mod product;
