//! PDF library endpoints
//!
//! - GET    /api/pdfs                 - List all PDFs
//! - GET    /api/pdfs/favorites       - List favorite PDFs
//! - POST   /api/pdfs                 - Create a record from metadata
//! - POST   /api/pdfs/upload          - Upload a PDF file (multipart field `file`)
//! - POST   /api/pdfs/from-url        - Register a remote PDF
//! - GET    /api/pdfs/:id             - Get a record
//! - PUT    /api/pdfs/:id             - Update name and/or favorite flag
//! - DELETE /api/pdfs/:id             - Delete a record
//! - PATCH  /api/pdfs/:id/favorite    - Toggle the favorite flag
//! - GET    /api/pdfs/:id/view        - Inline PDF bytes or a redirect

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::Value;

use crate::content::{self, PdfContent};
use crate::db::{CreatePdf, PdfDeleted, PdfRecord, PdfRepository, UpdatePdf};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Only this content type is accepted on upload
const PDF_MIME_TYPE: &str = "application/pdf";

/// Create the PDF router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/pdfs",
            get(list_pdfs)
                .post(create_pdf)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/pdfs/favorites", get(list_favorites))
        .route(
            "/pdfs/upload",
            post(upload_pdf).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/pdfs/from-url", post(import_from_url))
        .route("/pdfs/:id", get(get_pdf).put(update_pdf).delete(delete_pdf))
        .route("/pdfs/:id/favorite", patch(toggle_favorite))
        .route("/pdfs/:id/view", get(view_pdf))
}


async fn list_pdfs(State(state): State<AppState>) -> Result<Json<Vec<PdfRecord>>> {
    let repo = PdfRepository::new(state.db());
    let pdfs = repo.list(state.config().api.list_limit).await?;
    Ok(Json(pdfs))
}

async fn list_favorites(State(state): State<AppState>) -> Result<Json<Vec<PdfRecord>>> {
    let repo = PdfRepository::new(state.db());
    let pdfs = repo.list_favorites(state.config().api.list_limit).await?;
    Ok(Json(pdfs))
}

async fn get_pdf(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<PdfRecord>> {
    let repo = PdfRepository::new(state.db());
    Ok(Json(repo.get(&id).await?))
}

async fn create_pdf(
    State(state): State<AppState>,
    Json(data): Json<CreatePdf>,
) -> Result<Json<PdfRecord>> {
    let repo = PdfRepository::new(state.db());
    Ok(Json(repo.create(&data).await?))
}

async fn update_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdatePdf>,
) -> Result<Json<PdfRecord>> {
    let repo = PdfRepository::new(state.db());
    Ok(Json(repo.update(&id, &data).await?))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PdfRecord>> {
    let repo = PdfRepository::new(state.db());
    Ok(Json(repo.toggle_favorite(&id).await?))
}

async fn delete_pdf(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<PdfDeleted>> {
    let repo = PdfRepository::new(state.db());
    Ok(Json(repo.delete(&id).await?))
}

/// POST /api/pdfs/upload
///
/// Stores the uploaded bytes base64-encoded on the record itself.
async fn upload_pdf(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<PdfRecord>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read upload: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());

        if content_type.as_deref() != Some(PDF_MIME_TYPE) {
            tracing::debug!(?file_name, ?content_type, "Rejected non-PDF upload");
            return Err(AppError::BadRequest(
                "Only PDF files can be uploaded".to_string(),
            ));
        }

        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read file data: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        tracing::debug!(?file_name, size = data.len(), "Received PDF upload");

        let repo = PdfRepository::new(state.db());
        let record = repo.create(&CreatePdf::from_upload(file_name, &data)).await?;
        return Ok(Json(record));
    }

    Err(AppError::BadRequest(
        "No file provided. Use field name 'file'".to_string(),
    ))
}

/// POST /api/pdfs/from-url
///
/// The body is read as raw JSON so every malformed request maps to 400.
async fn import_from_url(State(state): State<AppState>, body: Bytes) -> Result<Json<PdfRecord>> {
    let request: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;
    let url = request.get("url").and_then(Value::as_str).unwrap_or("");

    let data = CreatePdf::from_url(url)?;
    let repo = PdfRepository::new(state.db());
    Ok(Json(repo.create(&data).await?))
}

/// GET /api/pdfs/:id/view
async fn view_pdf(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let record = PdfRepository::new(state.db()).get(&id).await?;

    let response = match content::resolve(&record)? {
        PdfContent::Inline { bytes, filename } => {
            tracing::debug!(pdf_id = %id, size = bytes.len(), "Serving PDF inline");
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, PDF_MIME_TYPE)
                .header(header::CONTENT_LENGTH, bytes.len())
                .header(
                    header::CONTENT_DISPOSITION,
                    content::content_disposition(&filename),
                )
                .body(Body::from(bytes))
        }
        PdfContent::Redirect(location) => {
            tracing::debug!(pdf_id = %id, %location, "Redirecting to external PDF");
            Response::builder()
                .status(StatusCode::FOUND)
                .header(header::LOCATION, location)
                .body(Body::empty())
        }
    };

    response.map_err(|e| AppError::Internal(e.to_string()))
}
