//! HTTP API Layer
//!
//! This crate provides the REST API for the exchange back office using Axum.
//!
//! # Architecture
//!
//! - **Service**: [`service::BackOffice`] wires the wallet ledger, tier engine,
//!   approval workflow and request intake
//! - **Handlers**: Thin request handlers for users and admins
//! - **Middleware**: Authentication, admin gate, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, service::BackOffice};
//!
//! let service = Arc::new(BackOffice::from_config(&config)?);
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod service;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware, require_admin};
use crate::handlers::{health, requests, users, verification};
use crate::service::BackOffice;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BackOffice>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - The wired back office
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(service: Arc<BackOffice>, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Customer routes
    let me_routes = Router::new()
        .route("/", post(users::register).get(users::me))
        .route("/documents", post(users::upload_document))
        .route(
            "/verifications",
            post(verification::submit).get(verification::list_mine),
        )
        .route("/deposits", post(requests::create_deposit))
        .route("/orders", post(requests::create_order))
        .route("/requests", get(requests::list_mine))
        .route("/requests/:id/cancel", post(requests::cancel));

    // Staff routes
    let admin_routes = Router::new()
        .route("/requests/pending", get(requests::admin_pending))
        .route("/requests/:id/resolve", post(requests::admin_resolve))
        .route("/requests/:id/complete", post(requests::admin_complete))
        .route("/verifications/pending", get(verification::admin_pending))
        .route("/verifications/:id/resolve", post(verification::admin_resolve))
        .route_layer(axum_middleware::from_fn(require_admin));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/me", me_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
