use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::StreamExt;
use sanitize_filename::sanitize;

use crate::attachment::{resolve_media_type, FileData};
use crate::ErrorResponse;

/// Name of the multipart field that carries the uploaded file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("No 'file' field in the upload")]
    MissingFile,
    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::MissingFile | MultipartParseError::FieldError(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error)))
            }
            MultipartParseError::TooLarge { .. } => HttpResponse::PayloadTooLarge()
                .json(ErrorResponse::new("PayloadTooLarge", &format!("{}", error))),
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    /// Read the single `file` field of an upload. Other fields are drained
    /// and ignored.
    pub async fn parse_file(
        mut multipart: Multipart,
        max_bytes: usize,
    ) -> Result<FileData, MultipartParseError> {
        let mut upload: Option<FileData> = None;

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| MultipartParseError::FieldError("Content disposition not found".to_string()))?;
            let field_name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();

            if field_name != FILE_FIELD || upload.is_some() {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                }
                continue;
            }

            let filename = content_disposition
                .get_filename()
                .map(|name| sanitize(name))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "upload".to_string());
            let declared = field.content_type().map(|mime| mime.essence_str().to_string());

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                if bytes.len() + chunk.len() > max_bytes {
                    return Err(MultipartParseError::TooLarge { limit: max_bytes });
                }
                bytes.extend_from_slice(&chunk);
            }

            let media_type = resolve_media_type(declared.as_deref(), &filename);
            log::debug!("Received upload '{}' ({}, {} bytes)", filename, media_type, bytes.len());
            upload = Some(FileData::new(filename, media_type, bytes));
        }

        upload.ok_or(MultipartParseError::MissingFile)
    }
}
