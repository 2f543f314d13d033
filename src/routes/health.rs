//! Health check endpoints

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "PDF viewer API is running",
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
