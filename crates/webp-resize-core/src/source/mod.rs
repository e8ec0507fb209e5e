//! Input sources: the collaborators that hand the pipeline its raw bytes.
//!
//! - **fetch**: download an image from an http(s) URL
//! - **upload**: validate uploaded files and derive download names

pub mod fetch;
pub mod upload;

pub use fetch::{validate_url, HttpFetcher, ImageFetcher};
pub use upload::{file_name_from_url, validate_file_type, validate_upload, webp_file_name};
