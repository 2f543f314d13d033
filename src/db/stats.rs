//! Library statistics
//!
//! Each counter is its own query. Under concurrent writes the five numbers
//! are not guaranteed to add up at any single instant.

use serde::Serialize;
use sqlx::SqlitePool;

use super::pdfs::PdfSourceType;
use crate::error::Result;

/// Aggregate counts over the PDF library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfStats {
    pub total_pdfs: i64,
    pub favorite_pdfs: i64,
    pub local_pdfs: i64,
    pub cloud_pdfs: i64,
    pub url_pdfs: i64,
}

pub struct StatsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StatsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn compute(&self) -> Result<PdfStats> {
        let (total_pdfs,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pdfs")
            .fetch_one(self.pool)
            .await?;

        let (favorite_pdfs,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pdfs WHERE is_favorite = 1")
                .fetch_one(self.pool)
                .await?;

        Ok(PdfStats {
            total_pdfs,
            favorite_pdfs,
            local_pdfs: self.count_by_type(PdfSourceType::Local).await?,
            cloud_pdfs: self.count_by_type(PdfSourceType::Cloud).await?,
            url_pdfs: self.count_by_type(PdfSourceType::Url).await?,
        })
    }

    async fn count_by_type(&self, source_type: PdfSourceType) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pdfs WHERE source_type = ?")
            .bind(source_type.as_str())
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, CreatePdf, PdfRepository};

    #[tokio::test]
    async fn test_empty_library() {
        let pool = create_memory_pool().await.unwrap();
        let stats = StatsRepository::new(&pool).compute().await.unwrap();
        assert_eq!(stats, PdfStats::default());
    }

    #[tokio::test]
    async fn test_counts_by_type_and_favorite() {
        let pool = create_memory_pool().await.unwrap();
        let pdfs = PdfRepository::new(&pool);

        let local = pdfs
            .create(&CreatePdf::from_upload(Some("a.pdf".to_string()), b"%PDF"))
            .await
            .unwrap();
        pdfs.create(&CreatePdf::from_url("https://x/b.pdf").unwrap())
            .await
            .unwrap();
        pdfs.create(&CreatePdf {
            name: "c".to_string(),
            uri: "cloud://bucket/c".to_string(),
            size: 12,
            source_type: PdfSourceType::Cloud,
            file_data: None,
        })
        .await
        .unwrap();
        pdfs.toggle_favorite(&local.id).await.unwrap();

        let stats = StatsRepository::new(&pool).compute().await.unwrap();
        assert_eq!(
            stats,
            PdfStats {
                total_pdfs: 3,
                favorite_pdfs: 1,
                local_pdfs: 1,
                cloud_pdfs: 1,
                url_pdfs: 1,
            }
        );
    }
}
