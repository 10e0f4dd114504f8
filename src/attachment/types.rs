//! File payloads moving through the wizard and out to the mail relay.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Transfer encoding used for every outbound attachment.
pub const BASE64_ENCODING: &str = "base64";

/// Raw file held in memory: an upload or a generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct FileData {
    pub filename: String,
    /// MIME type (e.g., "application/pdf")
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileData {
    pub fn new(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Create PDF file data.
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(filename, "application/pdf", bytes)
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Same content under a different name.
    pub fn renamed(&self, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            media_type: self.media_type.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

/// Attachment as the mail relay expects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Attachment {
    #[schema(example = "GuestForm_Unit7A_Jane_Doe.pdf")]
    pub filename: String,
    /// Base64-encoded file data
    pub content: String,
    #[schema(example = "base64")]
    pub encoding: String,
}

impl Attachment {
    pub fn encode(file: &FileData) -> Self {
        Self {
            filename: file.filename.clone(),
            content: BASE64.encode(&file.bytes),
            encoding: BASE64_ENCODING.to_string(),
        }
    }

    /// Decode base64 content back to bytes.
    pub fn decode_content(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.content)
    }
}

/// Summary of a retained artifact for listing in the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ArtifactInfo {
    pub index: usize,
    pub filename: String,
    pub media_type: String,
    pub size_bytes: usize,
}

impl ArtifactInfo {
    pub fn describe(index: usize, file: &FileData) -> Self {
        Self {
            index,
            filename: file.filename.clone(),
            media_type: file.media_type.clone(),
            size_bytes: file.size_bytes(),
        }
    }
}
