//! Route modules for Folio Server

pub mod annotations;
pub mod health;
pub mod pdfs;
pub mod stats;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Build the application router
///
/// Every resource lives under `/api`; `/health` is kept at the root for probes.
pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.config().api.max_upload_bytes;

    let api = Router::new()
        .merge(pdfs::router(max_upload_bytes))
        .merge(annotations::router())
        .merge(stats::router());

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api", get(health::health_check))
        .route("/api/", get(health::health_check))
        .nest("/api", api)
        .with_state(state)
}
