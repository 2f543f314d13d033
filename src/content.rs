//! Viewable content resolution
//!
//! Decides how a PDF record is shown to a client. The first matching rule wins:
//!
//! 1. `fileData` is present and non-empty: decode it and serve the bytes inline.
//! 2. `uri` is a `data:application/pdf;base64,` URI: decode its payload and
//!    serve the bytes inline.
//! 3. Otherwise `uri` is an external location and the client is redirected.
//!    Bytes outside visible ASCII are percent-encoded so the location is
//!    always a valid header value.
//!
//! The stored `type` tag is not consulted.

use std::fmt::Write;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

use crate::db::PdfRecord;

/// Prefix of inline PDF data URIs
pub const PDF_DATA_URI_PREFIX: &str = "data:application/pdf;base64,";

/// Content resolution failure
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Malformed base64 payload: {0}")]
    MalformedBase64(#[from] base64::DecodeError),
}

/// How a record's content is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfContent {
    /// Decoded PDF bytes with the download file name
    Inline { bytes: Vec<u8>, filename: String },
    /// External location the client should be sent to
    Redirect(String),
}

/// Resolve the viewable content of a record
pub fn resolve(record: &PdfRecord) -> Result<PdfContent, ContentError> {
    let payload = match record.file_data.as_deref() {
        Some(data) if !data.is_empty() => Some(data),
        _ => record.uri.strip_prefix(PDF_DATA_URI_PREFIX),
    };

    match payload {
        Some(encoded) => Ok(PdfContent::Inline {
            bytes: BASE64.decode(encoded)?,
            filename: inline_filename(&record.name),
        }),
        None => Ok(PdfContent::Redirect(redirect_location(&record.uri))),
    }
}

/// Percent-encode every byte outside `0x21..=0x7E`
///
/// Existing escapes and URL delimiters are left alone.
pub fn redirect_location(uri: &str) -> String {
    let mut location = String::with_capacity(uri.len());
    for byte in uri.bytes() {
        if byte.is_ascii_graphic() {
            location.push(byte as char);
        } else {
            let _ = write!(location, "%{:02X}", byte);
        }
    }
    location
}

/// File name for `Content-Disposition`
///
/// Non-ASCII characters are dropped in place and `.pdf` is appended when
/// missing.
pub fn inline_filename(name: &str) -> String {
    let ascii: String = name.chars().filter(|c| c.is_ascii()).collect();
    if ascii.trim().is_empty() {
        ensure_pdf_extension("document")
    } else {
        ensure_pdf_extension(&ascii)
    }
}

/// Append `.pdf` unless the name already ends with it (any case)
pub fn ensure_pdf_extension(name: &str) -> String {
    if name.to_ascii_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

/// `inline; filename="..."` with quoted-string escaping
pub fn content_disposition(filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len());
    for c in filename.chars().filter(|c| !c.is_ascii_control()) {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    format!("inline; filename=\"{}\"", quoted)
}
