//! Multipart file intake
//!
//! One file per request in a field named `file`, capped at 10MB, restricted
//! to the document/image types the frontend offers. Files land under
//! `<work_dir>/uploads` with a uuid name; the stored path is what gets
//! persisted on the task or profile.

use std::path::Path;

use axum::extract::Multipart;
use uuid::Uuid;

use crate::utils::{AppError, AppResult};

/// Upload size cap: 10MB
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// A stored upload
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Name on disk (uuid + original extension)
    pub filename: String,
    /// Name the client sent
    pub original_name: String,
    /// Path to persist ("/uploads/<filename>")
    pub relative_path: String,
    pub size: usize,
    pub content_type: String,
}

pub fn is_allowed_type(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Read the `file` field from a multipart body and store it
pub async fn receive_file(uploads_dir: &Path, mut multipart: Multipart) -> AppResult<StoredFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = field
            .content_type()
            .map(|c| c.to_string())
            .or_else(|| {
                mime_guess::from_path(&original_name)
                    .first_raw()
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !is_allowed_type(&content_type) {
            return Err(AppError::validation(format!(
                "File type '{}' is not allowed",
                content_type
            )));
        }

        let data = field.bytes().await?;
        if data.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::validation("File exceeds the 10MB size limit"));
        }
        if data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        let filename = match Path::new(&original_name)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_lowercase()),
            None => Uuid::new_v4().to_string(),
        };

        std::fs::create_dir_all(uploads_dir)
            .map_err(|e| AppError::internal(format!("Failed to create upload dir: {}", e)))?;
        let target = uploads_dir.join(&filename);
        std::fs::write(&target, &data)
            .map_err(|e| AppError::internal(format!("Failed to store upload: {}", e)))?;

        tracing::info!(
            file = %filename,
            size = data.len(),
            content_type = %content_type,
            "stored upload"
        );

        return Ok(StoredFile {
            relative_path: format!("/uploads/{}", filename),
            filename,
            original_name,
            size: data.len(),
            content_type,
        });
    }

    Err(AppError::validation("Missing 'file' field in upload"))
}
