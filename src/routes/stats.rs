//! Library statistics endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::db::{PdfStats, StatsRepository};
use crate::error::Result;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /api/stats
async fn get_stats(State(state): State<AppState>) -> Result<Json<PdfStats>> {
    let stats = StatsRepository::new(state.db()).compute().await?;
    Ok(Json(stats))
}
