//! # Tally API
//!
//! HTTP server for basket pricing and catalog maintenance.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally API Routes                                │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌───────────────────────────┐  ┌────────────┐ │
//! │  │  checkout          │  │  products                 │  │  health    │ │
//! │  │                    │  │                           │  │            │ │
//! │  │ • POST /checkout   │  │ • GET/POST /products      │  │ • GET      │ │
//! │  │                    │  │ • GET/PUT/DELETE          │  │   /health  │ │
//! │  │                    │  │     /products/{code}      │  │            │ │
//! │  │                    │  │ • POST/DELETE discounts   │  │            │ │
//! │  └────────────────────┘  └───────────────────────────┘  └────────────┘ │
//! │                                                                         │
//! │  Every route is served at the root and again under /api.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `TALLY_HOST` - Bind address (default: 0.0.0.0)
//! - `TALLY_PORT` - HTTP port (default: 8000)
//! - `DATABASE_PATH` - SQLite file (default: ./tally.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `SEED_ON_START` - Reset the catalog to the reference data at startup (default: false)
//! - `RUST_LOG` - Log filter (default: info,tally_api=debug)

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppState, SharedState};

/// Builds the application router.
///
/// The same routes are mounted at `/` and `/api` so that both plain clients
/// and a frontend proxying under `/api` reach them. The collection endpoints
/// also answer with a trailing slash (`/api/checkout/`), which is what the web
/// frontend sends.
pub fn router(state: Arc<AppState>) -> Router {
    let routes: Router<SharedState> = Router::new()
        .route("/checkout", post(routes::checkout::checkout))
        .route("/checkout/", post(routes::checkout::checkout))
        .route(
            "/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route(
            "/products/",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route(
            "/products/{code}",
            get(routes::products::get_product)
                .put(routes::products::update_product)
                .delete(routes::products::delete_product),
        )
        .route(
            "/products/{code}/discounts",
            post(routes::products::add_discount),
        )
        .route(
            "/products/{code}/discounts/{quantity}",
            delete(routes::products::remove_discount),
        )
        .route("/health", get(routes::health::health));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .with_state(state)
}
