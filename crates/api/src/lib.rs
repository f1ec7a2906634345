//! HTTP API server for business account signup.
//!
//! Exposes the provisioning saga at `POST /signup`, with structured
//! logging (tracing) and Prometheus metrics. Everything else the
//! dashboard frontend needs lives in the external backend and is out of
//! scope here.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use account_store::{AccountRepository, InMemoryAccountRepository};
use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::ProvisioningSaga;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::signup::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: AccountRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/signup", post(routes::signup::create::<R>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over an in-memory repository.
pub fn create_default_state() -> Arc<AppState<InMemoryAccountRepository>> {
    let repo = InMemoryAccountRepository::new();
    Arc::new(AppState {
        saga: ProvisioningSaga::new(repo),
    })
}
