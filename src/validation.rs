//! Input validation for wizard transitions.
//!
//! Errors carry the offending field, a message the operator can act on, and an
//! optional hint. A transition collects every problem before rejecting so the
//! operator sees the whole list at once.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Largest party a single registration may cover.
pub const MAX_GUESTS: u32 = 20;

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
            .with_suggestion(format!("Please fill in the {}", label.to_lowercase()))
    }

    pub fn guest_count_out_of_range(field: &str) -> Self {
        Self::new(
            field,
            format!("Number of guests must be between 1 and {}", MAX_GUESTS),
        )
    }

    pub fn missing_document(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must be uploaded", label))
    }

    pub fn unsupported_media_type(field: &str, media_type: &str, expected: &str) -> Self {
        Self::new(
            field,
            format!("Unsupported file type '{}'", media_type),
        )
        .with_suggestion(format!("Please upload {}", expected))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// True when some entry refers to `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Ok if no errors were collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {} problem(s) found", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

pub fn validate_guest_count(value: u32, field: &str, errors: &mut ValidationErrors) {
    if value == 0 || value > MAX_GUESTS {
        errors.add(ValidationError::guest_count_out_of_range(field));
    }
}

/// Identity documents may be a PDF scan or a photo.
pub fn is_identity_media_type(media_type: &str) -> bool {
    let media_type = media_type.trim().to_ascii_lowercase();
    media_type == "application/pdf" || media_type.starts_with("image/")
}

pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type.trim().eq_ignore_ascii_case("application/pdf")
}
