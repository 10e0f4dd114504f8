//! Runs one dispatch attempt: fill, package, send, record the outcome.

use parking_lot::Mutex;
use uuid::Uuid;

use super::message::{render_html, OutboundMessage};
use super::relay::MailRelay;
use super::DispatchError;
use crate::attachment::{packager, FileData};
use crate::form_fill::{self, FilledForm};
use crate::wizard::{DispatchJob, RegistrationSession, WizardError};

#[derive(Debug)]
pub enum DispatchOutcome {
    Sent { attachments: usize },
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }
}

/// Dispatch the session's registration.
///
/// Returns `Err` only when the session cannot start a dispatch. Every failure
/// after that is reported as `DispatchOutcome::Failed` and leaves the session
/// back on the review step with the recovery message and whatever artifacts
/// were generated. The lock is never held across an await point.
pub async fn dispatch(
    session: &Mutex<RegistrationSession>,
    relay: &dyn MailRelay,
) -> Result<DispatchOutcome, WizardError> {
    let job = session.lock().begin_dispatch()?;
    let session_id = job.session_id;

    log::info!(
        "Dispatching {} guest form(s) for unit {} to {} recipient(s)",
        job.guests.len(),
        job.unit_id,
        job.recipients.len()
    );

    let result = run(session, relay, job).await;

    let mut guard = session.lock();
    if guard.id() != session_id {
        log::warn!("Session {} was reset during dispatch; discarding the result", session_id);
        return Ok(DispatchOutcome::Failed(DispatchError::SessionReplaced));
    }

    match result {
        Ok(attachments) => {
            guard.complete_dispatch();
            log::info!("Dispatch for session {} sent {} attachment(s)", session_id, attachments);
            Ok(DispatchOutcome::Sent { attachments })
        }
        Err(err) => {
            guard.fail_dispatch();
            log::error!("Dispatch for session {} failed: {}", session_id, err);
            Ok(DispatchOutcome::Failed(err))
        }
    }
}

async fn run(
    session: &Mutex<RegistrationSession>,
    relay: &dyn MailRelay,
    job: DispatchJob,
) -> Result<usize, DispatchError> {
    let DispatchJob {
        session_id,
        unit_id,
        guests,
        template,
        recipients,
        subject,
    } = job;

    let forms = fill_blocking(template, guests.clone(), unit_id.clone()).await?;

    // Forms are downloadable as soon as they exist, even if packaging or
    // sending fails later.
    record(
        session,
        session_id,
        forms.iter().map(FilledForm::to_file).collect(),
    );

    let files = packager::collect(&forms, &guests);
    record(session, session_id, files.clone());

    let message = OutboundMessage {
        to: recipients,
        subject,
        html: render_html(&unit_id, &guests),
        attachments: packager::encode(&files),
    };
    relay.send(&message).await?;

    Ok(message.attachments.len())
}

async fn fill_blocking(
    template: Vec<u8>,
    guests: Vec<crate::guest::GuestRecord>,
    unit_id: String,
) -> Result<Vec<FilledForm>, DispatchError> {
    tokio::task::spawn_blocking(move || form_fill::fill(&template, &guests, &unit_id))
        .await
        .map_err(|err| DispatchError::Worker(err.to_string()))?
        .map_err(DispatchError::from)
}

fn record(session: &Mutex<RegistrationSession>, session_id: Uuid, files: Vec<FileData>) {
    let mut guard = session.lock();
    if guard.id() == session_id {
        guard.record_artifacts(files);
    }
}
