//! Turns filled forms and identity documents into mail attachments.

use super::file::{extension_of, underscore_whitespace};
use super::types::{Attachment, FileData};
use crate::form_fill::FilledForm;
use crate::guest::GuestRecord;

/// Name an identity document is sent under. A file without a dot keeps its
/// whole name as the extension, so `scan` becomes `ID_Jane.scan`.
pub fn identity_document_name(guest_name: &str, original_filename: &str) -> String {
    format!(
        "ID_{}.{}",
        underscore_whitespace(guest_name),
        extension_of(original_filename)
    )
}

/// Every file that goes out: all forms in guest order, then the identity
/// documents of the guests that have one.
pub fn collect(forms: &[FilledForm], guests: &[GuestRecord]) -> Vec<FileData> {
    let mut files: Vec<FileData> = forms.iter().map(FilledForm::to_file).collect();

    for guest in guests {
        let Some(document) = guest.identity_document.as_ref() else {
            continue;
        };
        let name = identity_document_name(&guest.name, &document.filename);
        log::debug!("Attaching identity document '{}' as '{}'", document.filename, name);
        files.push(document.renamed(name));
    }

    files
}

pub fn encode(files: &[FileData]) -> Vec<Attachment> {
    files.iter().map(Attachment::encode).collect()
}
