//! PDF record database operations

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::content::{ensure_pdf_extension, PDF_DATA_URI_PREFIX};
use crate::error::{AppError, Result};

/// Name given to uploads that arrive without a file name
pub const UNTITLED_PDF: &str = "Untitled PDF";

/// Where a PDF came from
///
/// Informational only: nothing checks it against the shape of `uri`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfSourceType {
    #[default]
    Local,
    Cloud,
    Url,
}

impl PdfSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfSourceType::Local => "local",
            PdfSourceType::Cloud => "cloud",
            PdfSourceType::Url => "url",
        }
    }

    fn from_db(value: &str) -> Self {
        match value {
            "cloud" => PdfSourceType::Cloud,
            "url" => PdfSourceType::Url,
            _ => PdfSourceType::Local,
        }
    }
}

/// PDF library record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRecord {
    pub id: String,
    pub name: String,
    pub uri: String,
    /// Byte count, 0 when unknown
    pub size: i64,
    pub date_added: DateTime<Utc>,
    pub is_favorite: bool,
    #[serde(rename = "type")]
    pub source_type: PdfSourceType,
    /// Base64 payload of directly uploaded files
    pub file_data: Option<String>,
    /// Reserved, never populated
    pub thumbnail_data: Option<String>,
}

/// Create PDF request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePdf {
    pub name: String,
    pub uri: String,
    pub size: i64,
    #[serde(rename = "type", default)]
    pub source_type: PdfSourceType,
    #[serde(default)]
    pub file_data: Option<String>,
}

impl CreatePdf {
    /// Build a local record carrying the uploaded bytes inline
    pub fn from_upload(file_name: Option<String>, bytes: &[u8]) -> Self {
        let encoded = BASE64.encode(bytes);

        Self {
            name: file_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNTITLED_PDF.to_string()),
            uri: format!("{}{}", PDF_DATA_URI_PREFIX, encoded),
            size: bytes.len() as i64,
            source_type: PdfSourceType::Local,
            file_data: Some(encoded),
        }
    }

    /// Build a URL record; the remote document is never fetched
    pub fn from_url(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::BadRequest("URL is required".to_string()));
        }

        Ok(Self {
            name: file_name_from_url(url),
            uri: url.to_string(),
            size: 0,
            source_type: PdfSourceType::Url,
            file_data: None,
        })
    }
}

/// Update PDF request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePdf {
    pub name: Option<String>,
    pub is_favorite: Option<bool>,
}

impl UpdatePdf {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_favorite.is_none()
    }
}

/// Confirmation returned after a delete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfDeleted {
    pub message: String,
    pub id: String,
    pub annotations_removed: u64,
}

/// Derive a display name from the last path segment of a URL
pub fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or("");
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    if decoded.trim().is_empty() {
        ensure_pdf_extension("document")
    } else {
        ensure_pdf_extension(&decoded)
    }
}

/// PDF record repository
pub struct PdfRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PdfRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a record, `None` if absent
    pub async fn find(&self, id: &str) -> Result<Option<PdfRecord>> {
        let row = sqlx::query_as::<_, PdfRow>(
            r#"
            SELECT id, name, uri, size, date_added, is_favorite, source_type,
                   file_data, thumbnail_data
            FROM pdfs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PdfRow::into_record).transpose()
    }

    /// Get a specific record
    pub async fn get(&self, id: &str) -> Result<PdfRecord> {
        self.find(id).await?.ok_or_else(|| pdf_not_found(id))
    }

    /// Whether a record with this id exists
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM pdfs WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// List all records, capped at `limit`
    pub async fn list(&self, limit: i64) -> Result<Vec<PdfRecord>> {
        let rows = sqlx::query_as::<_, PdfRow>(
            r#"
            SELECT id, name, uri, size, date_added, is_favorite, source_type,
                   file_data, thumbnail_data
            FROM pdfs
            ORDER BY date_added ASC, rowid ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PdfRow::into_record).collect()
    }

    /// List favorite records, capped at `limit`
    pub async fn list_favorites(&self, limit: i64) -> Result<Vec<PdfRecord>> {
        let rows = sqlx::query_as::<_, PdfRow>(
            r#"
            SELECT id, name, uri, size, date_added, is_favorite, source_type,
                   file_data, thumbnail_data
            FROM pdfs
            WHERE is_favorite = 1
            ORDER BY date_added ASC, rowid ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PdfRow::into_record).collect()
    }

    /// Create a new record
    pub async fn create(&self, data: &CreatePdf) -> Result<PdfRecord> {
        let record = PdfRecord {
            id: Uuid::new_v4().to_string(),
            name: data.name.clone(),
            uri: data.uri.clone(),
            size: data.size,
            date_added: Utc::now(),
            is_favorite: false,
            source_type: data.source_type,
            file_data: data.file_data.clone(),
            thumbnail_data: None,
        };

        sqlx::query(
            r#"
            INSERT INTO pdfs (id, name, uri, size, date_added, is_favorite, source_type, file_data, thumbnail_data)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.uri)
        .bind(record.size)
        .bind(format_timestamp(&record.date_added))
        .bind(record.is_favorite)
        .bind(record.source_type.as_str())
        .bind(&record.file_data)
        .bind(&record.thumbnail_data)
        .execute(self.pool)
        .await?;

        tracing::info!(
            pdf_id = %record.id,
            source_type = record.source_type.as_str(),
            size = record.size,
            "PDF record created"
        );

        Ok(record)
    }

    /// Flip the favorite flag in a single statement and return the new state
    pub async fn toggle_favorite(&self, id: &str) -> Result<PdfRecord> {
        let result = sqlx::query("UPDATE pdfs SET is_favorite = NOT is_favorite WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(pdf_not_found(id));
        }

        let record = self.get(id).await?;
        tracing::debug!(pdf_id = %id, is_favorite = record.is_favorite, "Favorite toggled");
        Ok(record)
    }

    /// Apply the supplied fields and return the record as stored afterwards
    pub async fn update(&self, id: &str, data: &UpdatePdf) -> Result<PdfRecord> {
        if data.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let mut set_clauses = Vec::new();
        if data.name.is_some() {
            set_clauses.push("name = ?");
        }
        if data.is_favorite.is_some() {
            set_clauses.push("is_favorite = ?");
        }

        let query = format!("UPDATE pdfs SET {} WHERE id = ?", set_clauses.join(", "));

        let mut sql_query = sqlx::query(&query);
        if let Some(ref name) = data.name {
            sql_query = sql_query.bind(name);
        }
        if let Some(is_favorite) = data.is_favorite {
            sql_query = sql_query.bind(is_favorite);
        }
        sql_query = sql_query.bind(id);

        let result = sql_query.execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(pdf_not_found(id));
        }

        self.get(id).await
    }

    /// Delete a record together with its annotations
    pub async fn delete(&self, id: &str) -> Result<PdfDeleted> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM pdfs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if removed.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(pdf_not_found(id));
        }

        let annotations = sqlx::query("DELETE FROM annotations WHERE pdf_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            pdf_id = %id,
            annotations_removed = annotations.rows_affected(),
            "PDF record deleted"
        );

        Ok(PdfDeleted {
            message: "PDF deleted successfully".to_string(),
            id: id.to_string(),
            annotations_removed: annotations.rows_affected(),
        })
    }
}

fn pdf_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("PDF not found: {}", id))
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Internal row type for SQLite queries
#[derive(sqlx::FromRow)]
struct PdfRow {
    id: String,
    name: String,
    uri: String,
    size: i64,
    date_added: String,
    is_favorite: bool,
    source_type: String,
    file_data: Option<String>,
    thumbnail_data: Option<String>,
}

impl PdfRow {
    fn into_record(self) -> Result<PdfRecord> {
        let date_added = DateTime::parse_from_rfc3339(&self.date_added)
            .map_err(|e| {
                AppError::Internal(format!("Invalid date_added on PDF {}: {}", self.id, e))
            })?
            .with_timezone(&Utc);

        Ok(PdfRecord {
            source_type: PdfSourceType::from_db(&self.source_type),
            id: self.id,
            name: self.name,
            uri: self.uri,
            size: self.size,
            date_added,
            is_favorite: self.is_favorite,
            file_data: self.file_data,
            thumbnail_data: self.thumbnail_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    fn url_pdf(name: &str) -> CreatePdf {
        CreatePdf {
            name: name.to_string(),
            uri: format!("https://example.com/{}.pdf", name),
            size: 0,
            source_type: PdfSourceType::Url,
            file_data: None,
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);

        let created = repo.create(&url_pdf("doc")).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(!created.is_favorite);
        assert!(created.thumbnail_data.is_none());

        let loaded = repo.get(&created.id).await.unwrap();
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.date_added, created.date_added);
        assert_eq!(loaded.source_type, PdfSourceType::Url);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);

        let a = repo.create(&url_pdf("same")).await.unwrap();
        let b = repo.create(&url_pdf("same")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(repo.list(1000).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);

        for i in 0..5 {
            repo.create(&url_pdf(&format!("doc-{}", i))).await.unwrap();
        }

        let limited = repo.list(3).await.unwrap();
        assert_eq!(limited.len(), 3);
        assert_eq!(limited[0].name, "doc-0");
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_original() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);
        let created = repo.create(&url_pdf("fav")).await.unwrap();

        let once = repo.toggle_favorite(&created.id).await.unwrap();
        assert!(once.is_favorite);
        assert_eq!(repo.list_favorites(1000).await.unwrap().len(), 1);

        let twice = repo.toggle_favorite(&created.id).await.unwrap();
        assert!(!twice.is_favorite);
        assert!(repo.list_favorites(1000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_missing_is_not_found() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);

        let err = repo.toggle_favorite("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_empty_is_invalid_even_when_missing() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);
        let created = repo.create(&url_pdf("doc")).await.unwrap();

        let err = repo.update(&created.id, &UpdatePdf::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = repo.update("missing", &UpdatePdf::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_touches_only_supplied_fields() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);
        let created = repo.create(&url_pdf("before")).await.unwrap();

        let renamed = repo
            .update(
                &created.id,
                &UpdatePdf {
                    name: Some("after".to_string()),
                    is_favorite: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "after");
        assert!(!renamed.is_favorite);
        assert_eq!(renamed.uri, created.uri);

        let favored = repo
            .update(
                &created.id,
                &UpdatePdf {
                    name: None,
                    is_favorite: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(favored.name, "after");
        assert!(favored.is_favorite);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);

        let err = repo
            .update(
                "missing",
                &UpdatePdf {
                    name: Some("x".to_string()),
                    is_favorite: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_stored_type_reads_as_local() {
        let pool = create_memory_pool().await.unwrap();
        sqlx::query(
            "INSERT INTO pdfs (id, name, uri, size, date_added, source_type) VALUES ('legacy', 'old', 'x', 0, ?, 'dropbox')",
        )
        .bind(format_timestamp(&Utc::now()))
        .execute(&pool)
        .await
        .unwrap();

        let record = PdfRepository::new(&pool).get("legacy").await.unwrap();
        assert_eq!(record.source_type, PdfSourceType::Local);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);

        let err = repo.delete("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_returns_id() {
        let pool = create_memory_pool().await.unwrap();
        let repo = PdfRepository::new(&pool);
        let created = repo.create(&url_pdf("gone")).await.unwrap();

        let deleted = repo.delete(&created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);
        assert!(repo.find(&created.id).await.unwrap().is_none());
        assert!(!repo.exists(&created.id).await.unwrap());
    }

    #[test]
    fn test_from_upload_encodes_payload_twice() {
        let data = CreatePdf::from_upload(Some("scan.pdf".to_string()), b"%PDF-1.4");
        assert_eq!(data.name, "scan.pdf");
        assert_eq!(data.size, 8);
        assert_eq!(data.source_type, PdfSourceType::Local);
        let encoded = data.file_data.clone().unwrap();
        assert_eq!(data.uri, format!("data:application/pdf;base64,{}", encoded));

        let untitled = CreatePdf::from_upload(None, b"");
        assert_eq!(untitled.name, UNTITLED_PDF);
        assert_eq!(untitled.size, 0);
    }

    #[test]
    fn test_from_url() {
        let data = CreatePdf::from_url("https://x/papers/report").unwrap();
        assert_eq!(data.name, "report.pdf");
        assert_eq!(data.uri, "https://x/papers/report");
        assert_eq!(data.size, 0);
        assert_eq!(data.source_type, PdfSourceType::Url);

        assert!(matches!(
            CreatePdf::from_url("   ").unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(file_name_from_url("https://x/doc.pdf"), "doc.pdf");
        assert_eq!(file_name_from_url("https://x/doc.pdf?dl=1#page=2"), "doc.pdf");
        assert_eq!(file_name_from_url("https://x/My%20Paper.pdf"), "My Paper.pdf");
        assert_eq!(file_name_from_url("https://x/files/"), "document.pdf");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = PdfRecord {
            id: "p1".to_string(),
            name: "Doc".to_string(),
            uri: "https://x/doc.pdf".to_string(),
            size: 0,
            date_added: Utc::now(),
            is_favorite: false,
            source_type: PdfSourceType::Url,
            file_data: None,
            thumbnail_data: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "url");
        assert_eq!(json["isFavorite"], false);
        assert!(json.get("dateAdded").is_some());
        assert!(json["fileData"].is_null());
    }
}
