// src/service/mod.rs
//
// Upload handling around the parse pipeline. The HTTP routes live in
// `routes`; this module decides status codes and bodies.

pub mod routes;

use bytes::Bytes;
use tracing::{info, instrument, warn};
use warp::http::StatusCode;

use crate::config::ServiceConfig;
use crate::error::{ErrorKind, ParseError};
use crate::inspect::{try_parse, ParseOptions, ParseResult};

pub use routes::routes;

pub const NO_FILE_PART: &str = "No file part";
pub const NO_SELECTED_FILE: &str = "No selected file";
pub const EMPTY_UPLOAD: &str = "Uploaded file is empty";

/// A file received from a client. The filename is only checked for presence.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub bytes: Bytes,
}

/// Status code plus the JSON body to send back.
#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub status: StatusCode,
    pub body: ParseResult,
}

impl UploadResponse {
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ParseResult::Failed {
                error: message.into(),
            },
        }
    }
}

fn status_for(err: &ParseError) -> StatusCode {
    match err.kind() {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::Format | ErrorKind::Decode | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Reject missing, unnamed and empty uploads before the core sees them.
fn validate(upload: Option<Upload>) -> Result<Upload, ParseError> {
    let upload = upload.ok_or_else(|| ParseError::input(NO_FILE_PART))?;
    match upload.filename.as_deref() {
        Some(name) if !name.is_empty() => {}
        _ => return Err(ParseError::input(NO_SELECTED_FILE)),
    }
    if upload.bytes.is_empty() {
        return Err(ParseError::input(EMPTY_UPLOAD));
    }
    Ok(upload)
}

/// Validate an upload, parse it, and pick the response status:
/// 400 for input problems, 413 for oversized files, 500 for parse failures.
#[instrument(level = "info", skip(upload, cfg))]
pub fn inspect_upload(upload: Option<Upload>, cfg: &ServiceConfig) -> UploadResponse {
    let upload = match validate(upload) {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "rejected upload");
            return UploadResponse::error(status_for(&e), e.to_string());
        }
    };

    let size = upload.bytes.len() as u64;
    if size > cfg.max_upload_bytes {
        warn!(size, limit = cfg.max_upload_bytes, "upload too large");
        return UploadResponse::error(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "Uploaded file is {} bytes; the limit is {} bytes",
                size, cfg.max_upload_bytes
            ),
        );
    }

    info!(filename = ?upload.filename, size, "reading parquet upload");
    let opts = ParseOptions {
        batch_size: cfg.batch_size,
    };
    match try_parse(upload.bytes, opts) {
        Ok(report) => UploadResponse {
            status: StatusCode::OK,
            body: ParseResult::Parsed(Box::new(report)),
        },
        Err(e) => UploadResponse::error(status_for(&e), e.to_string()),
    }
}
