//! Database module for SQLite persistence
//!
//! Holds the PDF library records, their annotations and the aggregate
//! counters built on top of them.

mod annotations;
mod pdfs;
mod schema;
mod stats;

pub use annotations::*;
pub use pdfs::*;
pub use schema::*;
pub use stats::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::error::Result;

/// Create a new database connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    initialize_schema(&pool).await?;

    Ok(pool)
}

/// Create a private in-memory database
///
/// Every connection to `:memory:` opens a separate database, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn create_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    initialize_schema(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_pool_persists_records() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("folio.db").display());

        let pool = create_pool(&url, 2).await.unwrap();
        let created = PdfRepository::new(&pool)
            .create(&CreatePdf {
                name: "Persisted".to_string(),
                uri: "https://example.com/a.pdf".to_string(),
                size: 0,
                source_type: PdfSourceType::Url,
                file_data: None,
            })
            .await
            .unwrap();
        pool.close().await;

        let reopened = create_pool(&url, 2).await.unwrap();
        let loaded = PdfRepository::new(&reopened).get(&created.id).await.unwrap();
        assert_eq!(loaded.name, "Persisted");
        assert_eq!(loaded.source_type, PdfSourceType::Url);
    }
}
