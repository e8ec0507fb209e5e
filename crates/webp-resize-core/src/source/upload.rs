//! Upload validation and output file naming.

use std::path::Path;

use crate::config::{LimitsConfig, UploadConfig};
use crate::error::SourceError;

/// Name used when nothing better can be derived.
pub const DEFAULT_FILE_NAME: &str = "image.webp";

/// Check that `file_name` carries one of the `allowed` extensions.
///
/// Matching is case-insensitive; `allowed` entries have no leading dot.
pub fn validate_file_type(file_name: &str, allowed: &[String]) -> Result<(), SourceError> {
    if file_name.is_empty() {
        return Err(SourceError::InvalidFileType("filename is empty".to_string()));
    }

    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| SourceError::InvalidFileType("file has no extension".to_string()))?;

    if allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
        Ok(())
    } else {
        Err(SourceError::InvalidFileType(format!(
            "extension .{} is not supported",
            ext
        )))
    }
}

/// Validate an uploaded file before it reaches the pipeline.
pub fn validate_upload(
    file_name: &str,
    data: &[u8],
    upload: &UploadConfig,
    limits: &LimitsConfig,
) -> Result<(), SourceError> {
    validate_file_type(file_name, &upload.allowed_extensions)?;
    if data.is_empty() {
        return Err(SourceError::EmptyFile);
    }
    if data.len() as u64 > limits.max_input_bytes() {
        return Err(SourceError::TooLarge {
            max_mb: limits.max_input_mb,
        });
    }
    Ok(())
}

/// Replace (or append) the extension of `original` with `.webp`.
pub fn webp_file_name(original: &str) -> String {
    if original.is_empty() {
        return DEFAULT_FILE_NAME.to_string();
    }
    match original.rfind('.') {
        Some(idx) => format!("{}.webp", &original[..idx]),
        None => format!("{}.webp", original),
    }
}

/// Derive a `.webp` download name from the last path segment of `url`.
pub fn file_name_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    match without_query.rfind('/') {
        Some(idx) if idx + 1 < without_query.len() => webp_file_name(&without_query[idx + 1..]),
        _ => DEFAULT_FILE_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        UploadConfig::default().allowed_extensions
    }

    #[test]
    fn test_valid_file_types() {
        for name in ["a.jpg", "b.JPEG", "c.png", "d.bmp", "e.webp", "f.tiff", "g.gif"] {
            assert!(validate_file_type(name, &allowed()).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_invalid_file_types() {
        assert!(matches!(
            validate_file_type("", &allowed()),
            Err(SourceError::InvalidFileType(_))
        ));
        assert!(matches!(
            validate_file_type("noext", &allowed()),
            Err(SourceError::InvalidFileType(_))
        ));
        let err = validate_file_type("doc.pdf", &allowed()).unwrap_err();
        assert!(err.to_string().contains(".pdf"));
    }

    #[test]
    fn test_validate_upload() {
        let upload = UploadConfig::default();
        let limits = LimitsConfig::default();
        assert!(validate_upload("a.png", b"bytes", &upload, &limits).is_ok());
        assert!(matches!(
            validate_upload("a.png", b"", &upload, &limits),
            Err(SourceError::EmptyFile)
        ));

        let tiny = LimitsConfig {
            max_input_mb: 1,
            ..LimitsConfig::default()
        };
        let big = vec![0u8; 1024 * 1024 + 1];
        assert!(matches!(
            validate_upload("a.png", &big, &upload, &tiny),
            Err(SourceError::TooLarge { max_mb: 1 })
        ));
    }

    #[test]
    fn test_webp_file_name() {
        assert_eq!(webp_file_name("photo.jpg"), "photo.webp");
        assert_eq!(webp_file_name("archive.tar.png"), "archive.tar.webp");
        assert_eq!(webp_file_name("noext"), "noext.webp");
        assert_eq!(webp_file_name(""), "image.webp");
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://example.com/img/cat.png?size=large"),
            "cat.webp"
        );
        assert_eq!(file_name_from_url("https://example.com/raw"), "raw.webp");
        assert_eq!(file_name_from_url("https://example.com/"), "image.webp");
        assert_eq!(file_name_from_url("nothing"), "image.webp");
    }
}
