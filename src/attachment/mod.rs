//! Attachment packaging for outbound mail.
//!
//! Generated forms and uploaded identity documents are collected into one
//! ordered list, renamed where needed, and base64-encoded for the relay.

pub mod file;
pub mod packager;
pub mod types;

pub use file::{resolve_media_type, underscore_whitespace};
pub use packager::{collect, encode, identity_document_name};
pub use types::{ArtifactInfo, Attachment, FileData, BASE64_ENCODING};
