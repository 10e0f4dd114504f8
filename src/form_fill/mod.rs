//! Form-fill engine - stamps guest details onto the blank registration form.
//!
//! The template is a single-page PDF whose layout is known in advance; the
//! engine writes each guest's details at fixed coordinates and returns one
//! filled PDF per guest.

pub mod engine;
pub mod layout;

pub use engine::{fill, fill_on, PdfFormFiller};
pub use layout::{FieldPlacement, FormField, FIELD_LAYOUT};

use thiserror::Error;

use crate::attachment::FileData;

/// Errors that can occur while filling forms.
#[derive(Debug, Error)]
pub enum FormFillError {
    #[error("template is not a readable PDF: {0}")]
    Load(#[source] lopdf::Error),
    #[error("failed to render form: {0}")]
    Render(String),
    #[error("failed to save filled form: {0}")]
    Save(#[source] std::io::Error),
}

/// Result of filling the template for one guest.
#[derive(Debug, Clone)]
pub struct FilledForm {
    pub filename: String,
    pub pdf: Vec<u8>,
}

impl FilledForm {
    pub fn to_file(&self) -> FileData {
        FileData::pdf(self.filename.clone(), self.pdf.clone())
    }
}
