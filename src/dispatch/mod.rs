//! Dispatch - fills the forms, packages attachments and hands the message to
//! the mail relay.
//!
//! - `message` - outbound payload, subject and body rendering
//! - `relay` - the `MailRelay` port and its HTTP implementation
//! - `orchestrator` - runs one dispatch attempt against the session

pub mod message;
pub mod orchestrator;
pub mod relay;

pub use message::{derive_subject, parse_recipients, render_html, resolve_subject, OutboundMessage};
pub use orchestrator::{dispatch, DispatchOutcome};
pub use relay::{HttpMailRelay, MailRelay};

use thiserror::Error;

use crate::form_fill::FormFillError;

/// Message shown to the operator whenever a dispatch attempt fails.
pub const RECOVERY_MESSAGE: &str = "The email server is currently unavailable. \
Please download the generated documents below and email them manually.";

/// Why a dispatch attempt failed. Only logged; the operator always sees
/// `RECOVERY_MESSAGE`.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Fill(#[from] FormFillError),
    #[error("form filling worker failed: {0}")]
    Worker(String),
    #[error("mail relay unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("mail relay rejected the message with status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Rejected { status: u16, message: Option<String> },
    #[error("session was reset while the dispatch was running")]
    SessionReplaced,
}
