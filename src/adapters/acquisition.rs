use std::sync::Arc;

use axum::extract::{multipart::MultipartError, Multipart};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::{
    application::error::ApplicationError,
    domain::{
        config::service::ServiceConfig,
        models::{
            file_record::NewFileEntry,
            preview::{is_previewable, PreviewCache},
        },
    },
};

const GENERIC_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub content: Bytes,
}

/// Reads every `file`/`files` part. Other parts are ignored.
pub async fn read_uploads(multipart: &mut Multipart) -> Result<Vec<UploadedFile>, ApplicationError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" && name != "files" {
            debug!("Skipping multipart field '{}'", name);
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                warn!("Upload part without a file name");
                ApplicationError::BadRequest("Missing file name".to_string())
            })?;
        let declared = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(multipart_error)?;

        uploads.push(UploadedFile {
            mime_type: resolve_mime_type(&file_name, declared.as_deref()),
            name: file_name,
            content,
        });
    }

    if uploads.is_empty() {
        return Err(ApplicationError::BadRequest(
            "Missing required 'file' field".to_string(),
        ));
    }

    Ok(uploads)
}

/// Declared type wins unless it is missing or generic; then the extension
/// decides.
pub fn resolve_mime_type(file_name: &str, declared: Option<&str>) -> String {
    match declared {
        Some(mime_type) if !mime_type.is_empty() && mime_type != GENERIC_MIME_TYPE => {
            mime_type.to_ascii_lowercase()
        }
        _ => mime_guess::from_path(file_name)
            .first_raw()
            .unwrap_or(GENERIC_MIME_TYPE)
            .to_string(),
    }
}

/// Admission check: allowed MIME type, non-empty, within the size limit.
pub fn admit(config: &ServiceConfig, upload: &UploadedFile) -> Result<(), ApplicationError> {
    if !config.mime_types.iter().any(|allowed| allowed == &upload.mime_type) {
        return Err(ApplicationError::UnsupportedMediaType(upload.mime_type.clone()));
    }

    let size = upload.content.len() as u64;
    if size == 0 {
        return Err(ApplicationError::BadRequest(format!(
            "File '{}' is empty",
            upload.name
        )));
    }
    if size > config.max_size {
        return Err(ApplicationError::PayloadTooLarge);
    }

    Ok(())
}

pub fn into_entry(upload: UploadedFile, previews: &Arc<PreviewCache>) -> NewFileEntry {
    let size = upload.content.len() as u64;
    let entry = NewFileEntry::new(upload.name, upload.mime_type.clone(), size);

    if is_previewable(&upload.mime_type) {
        entry.with_preview(previews.insert(upload.mime_type, upload.content))
    } else {
        entry
    }
}

fn multipart_error(error: MultipartError) -> ApplicationError {
    if error.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        return ApplicationError::PayloadTooLarge;
    }
    warn!("Invalid multipart data: {}", error);
    ApplicationError::BadRequest("Invalid request format".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, mime_type: &str, len: usize) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            content: Bytes::from(vec![7u8; len]),
        }
    }

    #[test]
    fn test_resolve_mime_type() {
        assert_eq!(resolve_mime_type("a.png", Some("image/png")), "image/png");
        assert_eq!(resolve_mime_type("a.pdf", None), "application/pdf");
        assert_eq!(resolve_mime_type("a.jpg", Some(GENERIC_MIME_TYPE)), "image/jpeg");
        assert_eq!(resolve_mime_type("noext", None), GENERIC_MIME_TYPE);
    }

    #[test]
    fn test_admit() {
        let config = ServiceConfig {
            max_size: 10,
            ..ServiceConfig::default()
        };
        assert!(admit(&config, &upload("a.pdf", "application/pdf", 10)).is_ok());
        assert!(matches!(
            admit(&config, &upload("a.zip", "application/zip", 3)),
            Err(ApplicationError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            admit(&config, &upload("a.pdf", "application/pdf", 11)),
            Err(ApplicationError::PayloadTooLarge)
        ));
        assert!(matches!(
            admit(&config, &upload("a.pdf", "application/pdf", 0)),
            Err(ApplicationError::BadRequest(_))
        ));
    }

    #[test]
    fn test_only_images_get_previews() {
        let previews = PreviewCache::new();
        let image = into_entry(upload("a.png", "image/png", 4), &previews);
        let document = into_entry(upload("a.pdf", "application/pdf", 4), &previews);
        assert!(image.preview.is_some());
        assert!(document.preview.is_none());
        assert_eq!(previews.len(), 1);
    }
}
