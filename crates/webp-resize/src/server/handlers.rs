//! Request handlers for the process and health routes.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Instant;
use webp_resize_core::config::LimitsConfig;
use webp_resize_core::source::{file_name_from_url, validate_upload, validate_url, webp_file_name};
use webp_resize_core::{ProcessOptions, RequestParams, ResponseFlags, SourceError, Transcoded};

use super::error::ApiError;
use super::AppState;

/// Used when the derived file name is not a valid header value.
const FALLBACK_ATTACHMENT: &str = "attachment; filename=image.webp";

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK" }))
}

/// `GET|POST /process/url?url=...`
pub async fn process_url(
    State(state): State<AppState>,
    query: Result<Query<RequestParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let start = Instant::now();
    let Query(params) = query?;
    let url = params.get("url").map(String::as_str).unwrap_or_default();
    validate_url(url)?;

    let options = ProcessOptions::from_params(&params, &state.defaults());
    let data = state.fetcher.fetch(url).await?;
    let result = state.processor.process(data, options).await?;

    tracing::debug!(
        "Processed {} -> {}x{} ({}%) in {:?}",
        url,
        result.metadata.new_width,
        result.metadata.new_height,
        result.metadata.size_reduction_percent,
        start.elapsed()
    );
    Ok(respond(
        result,
        ResponseFlags::from_params(&params),
        &file_name_from_url(url),
    ))
}

/// `POST /process/upload` with the image in a multipart field.
pub async fn process_upload(
    State(state): State<AppState>,
    query: Result<Query<RequestParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let start = Instant::now();
    let Query(params) = query?;
    let mut multipart = multipart.map_err(|e| SourceError::Read(e.body_text()))?;
    let config = &state.config;

    let (file_name, data) =
        read_upload_field(&mut multipart, &config.upload.field_name, &config.limits).await?;
    validate_upload(&file_name, &data, &config.upload, &config.limits)?;

    let options = ProcessOptions::from_params(&params, &state.defaults());
    let result = state.processor.process(data, options).await?;

    tracing::debug!(
        "Processed upload {:?} -> {}x{} ({}%) in {:?}",
        file_name,
        result.metadata.new_width,
        result.metadata.new_height,
        result.metadata.size_reduction_percent,
        start.elapsed()
    );
    Ok(respond(
        result,
        ResponseFlags::from_params(&params),
        &webp_file_name(&file_name),
    ))
}

/// Find `field_name` among the multipart fields and read it fully.
async fn read_upload_field(
    multipart: &mut Multipart,
    field_name: &str,
    limits: &LimitsConfig,
) -> Result<(String, Vec<u8>), SourceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limits))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limits))?;
        return Ok((file_name, data.to_vec()));
    }

    Err(SourceError::NoFile(field_name.to_string()))
}

fn multipart_error(err: MultipartError, limits: &LimitsConfig) -> SourceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SourceError::TooLarge {
            max_mb: limits.max_input_mb,
        }
    } else {
        SourceError::Read(err.body_text())
    }
}

/// WebP bytes, or the metadata JSON when `metadata=true`.
fn respond(result: Transcoded, flags: ResponseFlags, download_name: &str) -> Response {
    if flags.metadata {
        return Json(result.metadata).into_response();
    }

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/webp"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(result.data.len()));
    if flags.download {
        headers.insert(header::CONTENT_DISPOSITION, attachment(download_name));
    }

    (StatusCode::OK, headers, result.data).into_response()
}

fn attachment(file_name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("attachment; filename={}", file_name))
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_ATTACHMENT))
}
