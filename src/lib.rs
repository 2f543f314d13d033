//! Folio Server Library
//!
//! A small backend for a PDF library: records registered by upload, by URL
//! or from raw metadata, inline viewing of stored PDFs, page annotations and
//! usage statistics. Records live in SQLite.
//!
//! # Modules
//!
//! - `db`: Schema and repositories for PDFs, annotations and statistics
//! - `content`: Decides whether a record is served inline or redirected
//! - `routes`: axum routers mounted under `/api`

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
