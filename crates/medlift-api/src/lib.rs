//! # Medlift API
//!
//! JSON REST service for the medlift drone fleet.
//!
//! ## Features
//!
//! - **Drones**: registration, bulk registration, attribute updates, availability
//! - **Medications**: registration, bulk registration, attribute updates
//! - **Loads**: load and unload medications under per-drone serialization
//! - **Battery audit**: periodic battery snapshots with stale-state reset
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! │            (REST routes, CORS, request tracing)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      AppContext                             │
//! │              (Fleet service, configuration)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │   Battery Audit Task    │   │        MemoryStore           │
//! │   (interval, watch)     │   │   (drones, medications, logs)│
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod payload;
pub mod routes;
pub mod tasks;

use axum::Router;
use axum::http::Method;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use context::{AppContext, AppContextBuilder, FleetService};
pub use error::{ApiError, ApiResult};
pub use tasks::BatteryAuditTask;

/// Build the Axum router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(Any)
        .allow_headers(Any);

    let api = routes::api_routes();
    let router = if ctx.config.api_prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&ctx.config.api_prefix, api)
    };

    router
        .route("/health", get(routes::health::health_check))
        .with_state(ctx)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
