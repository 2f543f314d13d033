//! Annotation database operations
//!
//! Annotations are positional notes attached to a page of a PDF record. The
//! parent record is checked when an annotation is listed or created; after
//! that the link is a plain reference.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::pdfs::{format_timestamp, PdfRepository};
use crate::error::{AppError, Result};

pub const DEFAULT_ANNOTATION_TYPE: &str = "text";
pub const DEFAULT_ANNOTATION_COLOR: &str = "#FFFF00";

/// Annotation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Annotation {
    pub id: String,
    pub pdf_id: String,
    /// `text`, `highlight` or `drawing`; not enforced
    #[serde(rename = "type")]
    pub annotation_type: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 1-based page number
    pub page: i64,
    pub content: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Create annotation request, every field falls back to its default
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAnnotation {
    #[serde(rename = "type")]
    pub annotation_type: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub page: Option<i64>,
    pub content: Option<String>,
    pub color: Option<String>,
}

/// Update annotation request, omitted fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnnotation {
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<String>,
}

/// Confirmation returned after a create
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationCreated {
    pub message: String,
    pub annotation: Annotation,
}

/// Plain confirmation for update and delete
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationMessage {
    pub message: String,
}

/// Annotation repository
pub struct AnnotationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AnnotationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List annotations of an existing PDF
    pub async fn list_by_pdf(&self, pdf_id: &str) -> Result<Vec<Annotation>> {
        self.ensure_pdf(pdf_id).await?;

        let annotations = sqlx::query_as::<_, Annotation>(
            r#"
            SELECT id, pdf_id, annotation_type, x, y, width, height, page,
                   content, color, created_at, updated_at
            FROM annotations
            WHERE pdf_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(pdf_id)
        .fetch_all(self.pool)
        .await?;

        Ok(annotations)
    }

    /// Get an annotation scoped to its PDF
    pub async fn find(&self, pdf_id: &str, annotation_id: &str) -> Result<Option<Annotation>> {
        let annotation = sqlx::query_as::<_, Annotation>(
            r#"
            SELECT id, pdf_id, annotation_type, x, y, width, height, page,
                   content, color, created_at, updated_at
            FROM annotations
            WHERE id = ? AND pdf_id = ?
            "#,
        )
        .bind(annotation_id)
        .bind(pdf_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(annotation)
    }

    /// Create a new annotation on an existing PDF
    pub async fn create(&self, pdf_id: &str, data: &CreateAnnotation) -> Result<AnnotationCreated> {
        self.ensure_pdf(pdf_id).await?;

        let now = format_timestamp(&Utc::now());
        let annotation = Annotation {
            id: Uuid::new_v4().to_string(),
            pdf_id: pdf_id.to_string(),
            annotation_type: data
                .annotation_type
                .clone()
                .unwrap_or_else(|| DEFAULT_ANNOTATION_TYPE.to_string()),
            x: data.x.unwrap_or(0.0),
            y: data.y.unwrap_or(0.0),
            width: data.width.unwrap_or(0.0),
            height: data.height.unwrap_or(0.0),
            page: data.page.unwrap_or(1),
            content: data.content.clone().unwrap_or_default(),
            color: data
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_ANNOTATION_COLOR.to_string()),
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO annotations (id, pdf_id, annotation_type, x, y, width, height, page, content, color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&annotation.id)
        .bind(&annotation.pdf_id)
        .bind(&annotation.annotation_type)
        .bind(annotation.x)
        .bind(annotation.y)
        .bind(annotation.width)
        .bind(annotation.height)
        .bind(annotation.page)
        .bind(&annotation.content)
        .bind(&annotation.color)
        .bind(&annotation.created_at)
        .bind(&annotation.updated_at)
        .execute(self.pool)
        .await?;

        tracing::debug!(
            pdf_id = %pdf_id,
            annotation_id = %annotation.id,
            page = annotation.page,
            "Annotation created"
        );

        Ok(AnnotationCreated {
            message: "Annotation added successfully".to_string(),
            annotation,
        })
    }

    /// Merge the supplied fields over the stored annotation
    pub async fn update(
        &self,
        pdf_id: &str,
        annotation_id: &str,
        data: &UpdateAnnotation,
    ) -> Result<AnnotationMessage> {
        let existing = self.find(pdf_id, annotation_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Annotation not found: {}", annotation_id))
        })?;

        self.write_merged(&existing, data).await?;

        Ok(AnnotationMessage {
            message: "Annotation updated successfully".to_string(),
        })
    }

    /// Write the merged row; zero affected rows means it vanished after the lookup
    async fn write_merged(&self, existing: &Annotation, data: &UpdateAnnotation) -> Result<()> {
        let content = data.content.as_ref().unwrap_or(&existing.content);
        let x = data.x.unwrap_or(existing.x);
        let y = data.y.unwrap_or(existing.y);
        let color = data.color.as_ref().unwrap_or(&existing.color);

        let result = sqlx::query(
            r#"
            UPDATE annotations
            SET content = ?, x = ?, y = ?, color = ?, updated_at = ?
            WHERE id = ? AND pdf_id = ?
            "#,
        )
        .bind(content)
        .bind(x)
        .bind(y)
        .bind(color)
        .bind(format_timestamp(&Utc::now()))
        .bind(&existing.id)
        .bind(&existing.pdf_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::MutationFailed(format!(
                "Annotation {} on PDF {} was not updated",
                existing.id, existing.pdf_id
            )));
        }

        Ok(())
    }

    /// Delete an annotation scoped to its PDF
    pub async fn delete(&self, pdf_id: &str, annotation_id: &str) -> Result<AnnotationMessage> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = ? AND pdf_id = ?")
            .bind(annotation_id)
            .bind(pdf_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Annotation not found: {}",
                annotation_id
            )));
        }

        Ok(AnnotationMessage {
            message: "Annotation deleted successfully".to_string(),
        })
    }

    async fn ensure_pdf(&self, pdf_id: &str) -> Result<()> {
        if PdfRepository::new(self.pool).exists(pdf_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("PDF not found: {}", pdf_id)))
        }
    }
}
