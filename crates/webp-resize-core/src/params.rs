//! Request parameter parsing.
//!
//! Query strings carry the processing options and a couple of response
//! flags. Invalid option values are ignored in favor of the defaults rather
//! than rejected.

use std::collections::HashMap;

use crate::types::ProcessOptions;

/// Raw query parameters of a request.
pub type RequestParams = HashMap<String, String>;

/// Response-shaping flags carried next to the processing options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseFlags {
    /// Respond with metadata JSON instead of the WebP bytes
    pub metadata: bool,

    /// Add a `Content-Disposition: attachment` header
    pub download: bool,
}

impl ResponseFlags {
    pub fn from_params(params: &RequestParams) -> Self {
        let is_true = |key: &str| params.get(key).map(String::as_str) == Some("true");
        Self {
            metadata: is_true("metadata"),
            download: is_true("download")
                || params.get("format").map(String::as_str) == Some("webp"),
        }
    }
}

impl ProcessOptions {
    /// Overlay request parameters on `defaults`.
    ///
    /// - `max_width`, `max_height`: accepted when an integer > 0
    /// - `quality`: accepted when an integer in 1..=100
    /// - `preserve_ratio`: false only for the exact string `"false"`
    pub fn from_params(params: &RequestParams, defaults: &ProcessOptions) -> Self {
        let mut options = defaults.clone();

        if let Some(width) = parse_param::<u32>(params, "max_width", |w| *w > 0) {
            options.max_width = width;
        }
        if let Some(height) = parse_param::<u32>(params, "max_height", |h| *h > 0) {
            options.max_height = height;
        }
        if let Some(quality) = parse_param::<i32>(params, "quality", |q| (1..=100).contains(q)) {
            options.quality = quality;
        }
        if let Some(preserve) = params.get("preserve_ratio").filter(|v| !v.is_empty()) {
            options.preserve_ratio = preserve != "false";
        }

        options
    }
}

fn parse_param<T>(params: &RequestParams, key: &str, accept: impl Fn(&T) -> bool) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = params.get(key).filter(|v| !v.is_empty())?;
    match raw.parse::<T>() {
        Ok(value) if accept(&value) => Some(value),
        _ => {
            tracing::debug!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
