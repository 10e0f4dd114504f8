//! Filename and media type helpers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Replace every run of whitespace with a single underscore.
pub fn underscore_whitespace(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value, "_").into_owned()
}

/// Text after the last dot. A name without a dot is its own extension.
pub fn extension_of(filename: &str) -> &str {
    filename.rsplit('.').next().unwrap_or(filename)
}

/// Media type for an upload: the declared type when present, else a guess
/// from the filename.
pub fn resolve_media_type(declared: Option<&str>, filename: &str) -> String {
    match declared.map(str::trim).filter(|t| !t.is_empty()) {
        Some(declared) => declared.to_ascii_lowercase(),
        None => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}
