//! Annotation API endpoints
//!
//! Annotations are always addressed through their parent PDF.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::db::{
    Annotation, AnnotationCreated, AnnotationMessage, AnnotationRepository, CreateAnnotation,
    UpdateAnnotation,
};
use crate::error::Result;
use crate::state::AppState;

/// Create the annotations router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/pdfs/:id/annotations",
            get(list_annotations).post(create_annotation),
        )
        .route(
            "/pdfs/:id/annotations/:annotation_id",
            put(update_annotation).delete(delete_annotation),
        )
}

#[derive(Debug, Serialize)]
pub struct AnnotationsListResponse {
    pub annotations: Vec<Annotation>,
}

async fn list_annotations(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<Json<AnnotationsListResponse>> {
    let repo = AnnotationRepository::new(state.db());
    let annotations = repo.list_by_pdf(&pdf_id).await?;
    Ok(Json(AnnotationsListResponse { annotations }))
}

async fn create_annotation(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
    Json(data): Json<CreateAnnotation>,
) -> Result<Json<AnnotationCreated>> {
    let repo = AnnotationRepository::new(state.db());
    Ok(Json(repo.create(&pdf_id, &data).await?))
}

async fn update_annotation(
    State(state): State<AppState>,
    Path((pdf_id, annotation_id)): Path<(String, String)>,
    Json(data): Json<UpdateAnnotation>,
) -> Result<Json<AnnotationMessage>> {
    let repo = AnnotationRepository::new(state.db());
    Ok(Json(repo.update(&pdf_id, &annotation_id, &data).await?))
}

async fn delete_annotation(
    State(state): State<AppState>,
    Path((pdf_id, annotation_id)): Path<(String, String)>,
) -> Result<Json<AnnotationMessage>> {
    let repo = AnnotationRepository::new(state.db());
    Ok(Json(repo.delete(&pdf_id, &annotation_id).await?))
}
