// src/service/routes.rs

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::TryStreamExt;
use std::{convert::Infallible, sync::Arc, time::Instant};
use tracing::{error, info, warn};
use warp::{
    http::StatusCode,
    multipart::{FormData, Part},
    reject::Rejection,
    reply::Reply,
    Filter,
};

use super::{inspect_upload, Upload, UploadResponse, NO_FILE_PART};
use crate::config::ServiceConfig;

/// Form field that carries the Parquet file.
pub const FILE_FIELD: &str = "file";
/// Allowance for multipart boundaries and part headers on top of the file limit.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

fn reply(resp: UploadResponse) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&resp.body), resp.status).into_response()
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "pqscope"
    })))
}

/// Buffer one multipart part into memory.
async fn read_part(part: Part) -> Result<Bytes, warp::Error> {
    let mut buf = BytesMut::new();
    let mut stream = Box::pin(part.stream());
    while let Some(chunk) = stream.try_next().await? {
        buf.put(chunk);
    }
    Ok(buf.freeze())
}

/// Pull the `file` part out of the form; other parts are ignored.
async fn read_upload(mut form: FormData) -> Result<Option<Upload>, warp::Error> {
    while let Some(part) = form.try_next().await? {
        if part.name() != FILE_FIELD {
            continue;
        }
        let filename = part.filename().map(str::to_string);
        let bytes = read_part(part).await?;
        return Ok(Some(Upload { filename, bytes }));
    }
    Ok(None)
}

async fn upload_parquet(form: FormData, cfg: Arc<ServiceConfig>) -> Result<impl Reply, Rejection> {
    let start = Instant::now();

    let upload = match read_upload(form).await {
        Ok(u) => u,
        Err(e) => {
            warn!("failed to read multipart body: {}", e);
            return Ok(reply(UploadResponse::error(
                StatusCode::BAD_REQUEST,
                format!("Failed to read upload: {}", e),
            )));
        }
    };

    // parsing is CPU-bound; keep it off the async workers
    let resp = match tokio::task::spawn_blocking(move || inspect_upload(upload, &cfg)).await {
        Ok(resp) => resp,
        Err(e) => {
            error!("parse task failed: {}", e);
            UploadResponse::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    };

    info!(
        status = resp.status.as_u16(),
        elapsed = ?start.elapsed(),
        "upload handled"
    );
    Ok(reply(resp))
}

/// Map rejections onto the same `{"error": ...}` body shape.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Upload exceeds the maximum allowed size".to_string(),
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length is required".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        // typically a body that is not multipart/form-data
        warn!("unhandled rejection: {:?}", err);
        (StatusCode::BAD_REQUEST, NO_FILE_PART.to_string())
    };
    Ok(reply(UploadResponse::error(status, message)))
}

/// `GET /health` and `POST /upload_parquet`.
pub fn routes(
    cfg: Arc<ServiceConfig>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let body_limit = cfg.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    let with_config = warp::any().map(move || Arc::clone(&cfg));

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let upload = warp::path("upload_parquet")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(body_limit))
        .and(warp::multipart::form().max_length(body_limit))
        .and(with_config)
        .and_then(upload_parquet);

    health.or(upload).recover(handle_rejection)
}
