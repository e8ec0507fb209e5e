//! Mapping of core errors onto HTTP responses.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use webp_resize_core::{PipelineError, SourceError};

/// A request failure, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    /// Obtaining the input bytes failed
    Source(SourceError),
    /// The transcoding pipeline failed
    Pipeline(PipelineError),
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        Self::Source(err)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Source(SourceError::InvalidQuery(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Source(SourceError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Source(_) => StatusCode::BAD_REQUEST,
            Self::Pipeline(err) => match err {
                PipelineError::UnsupportedFormat(_) | PipelineError::InvalidImage(_) => {
                    StatusCode::BAD_REQUEST
                }
                PipelineError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                PipelineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                PipelineError::ResizeFailed(_)
                | PipelineError::EncodingFailed(_)
                | PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Source(err) => err.to_string(),
            Self::Pipeline(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (SourceError::EmptyUrl.into(), StatusCode::BAD_REQUEST),
            (SourceError::HttpStatus(404).into(), StatusCode::BAD_REQUEST),
            (
                SourceError::TooLarge { max_mb: 1 }.into(),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                PipelineError::UnsupportedFormat("gif".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::InvalidImage("truncated".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::ImageTooLarge {
                    width: 30000,
                    height: 10,
                    max_dim: 20000,
                }
                .into(),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                PipelineError::EncodingFailed("oom".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PipelineError::Timeout {
                    stage: "transcode".into(),
                    timeout_ms: 5,
                }
                .into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_query_rejection_renders_json() {
        use axum::extract::Query;
        use std::collections::HashMap;

        let uri: axum::http::Uri = "/process/url?max_width=wide".parse().unwrap();
        let rejection = Query::<HashMap<String, u32>>::try_from_uri(&uri).unwrap_err();

        let response = ApiError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query string"));
    }
}
