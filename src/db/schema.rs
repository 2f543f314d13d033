//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL)
        .execute(pool)
        .await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- PDF library records
CREATE TABLE IF NOT EXISTS pdfs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    -- External URL, data URI or opaque local reference
    uri TEXT NOT NULL,
    size INTEGER NOT NULL DEFAULT 0,
    date_added TEXT NOT NULL,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    -- 'local', 'cloud' or 'url'
    source_type TEXT NOT NULL DEFAULT 'local',
    -- Base64 payload of uploaded files
    file_data TEXT,
    thumbnail_data TEXT
);

CREATE INDEX IF NOT EXISTS idx_pdfs_is_favorite ON pdfs(is_favorite);
CREATE INDEX IF NOT EXISTS idx_pdfs_source_type ON pdfs(source_type);
CREATE INDEX IF NOT EXISTS idx_pdfs_date_added ON pdfs(date_added);

-- Positional page annotations
CREATE TABLE IF NOT EXISTS annotations (
    id TEXT PRIMARY KEY,
    pdf_id TEXT NOT NULL,
    -- 'text', 'highlight', 'drawing' (not enforced)
    annotation_type TEXT NOT NULL DEFAULT 'text',
    x REAL NOT NULL DEFAULT 0,
    y REAL NOT NULL DEFAULT 0,
    width REAL NOT NULL DEFAULT 0,
    height REAL NOT NULL DEFAULT 0,
    page INTEGER NOT NULL DEFAULT 1,
    content TEXT NOT NULL DEFAULT '',
    color TEXT NOT NULL DEFAULT '#FFFF00',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_annotations_pdf_id ON annotations(pdf_id);
"#;
