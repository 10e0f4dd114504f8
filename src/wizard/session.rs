//! The registration session and its step machine.

use thiserror::Error;
use uuid::Uuid;

use crate::attachment::FileData;
use crate::dispatch::{parse_recipients, resolve_subject, RECOVERY_MESSAGE};
use crate::guest::{GuestRecord, GuestUpdate};
use crate::validation::{
    is_identity_media_type, is_pdf_media_type, validate_guest_count, validate_required,
    ValidationError, ValidationErrors,
};

/// Recipients pre-filled on every new session.
pub const DEFAULT_RECIPIENTS: &str =
    "bookings@example.com, reception@example.com, facilities@example.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    Idle,
    Running,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Setup,
    GuestCapture { index: usize },
    TemplateUpload,
    ReviewAndSend { dispatch: DispatchStatus },
    Done,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Setup => "setup",
            Step::GuestCapture { .. } => "guest_capture",
            Step::TemplateUpload => "template_upload",
            Step::ReviewAndSend { .. } => "review_and_send",
            Step::Done => "done",
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("cannot {action} during the {step} step")]
    InvalidTransition {
        action: &'static str,
        step: &'static str,
    },
    #[error("a dispatch is already in progress")]
    Busy,
}

impl From<ValidationErrors> for WizardError {
    fn from(errors: ValidationErrors) -> Self {
        WizardError::Validation(errors)
    }
}

impl From<ValidationError> for WizardError {
    fn from(error: ValidationError) -> Self {
        WizardError::Validation(error.into())
    }
}

/// Owned snapshot of everything a dispatch attempt needs, taken so the
/// session lock is not held while forms are filled and mail is sent.
#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub session_id: Uuid,
    pub unit_id: String,
    pub guests: Vec<GuestRecord>,
    pub template: Vec<u8>,
    pub recipients: Vec<String>,
    pub subject: String,
}

/// One operator's registration run. Only this type mutates its fields.
#[derive(Debug)]
pub struct RegistrationSession {
    id: Uuid,
    step: Step,
    unit_id: String,
    guest_count: u32,
    guests: Vec<GuestRecord>,
    template: Option<FileData>,
    recipients: String,
    subject_override: String,
    artifacts: Vec<FileData>,
}

impl Default for RegistrationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: Step::Setup,
            unit_id: String::new(),
            guest_count: 0,
            guests: Vec::new(),
            template: None,
            recipients: DEFAULT_RECIPIENTS.to_string(),
            subject_override: String::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn guest_count(&self) -> u32 {
        self.guest_count
    }

    pub fn guests(&self) -> &[GuestRecord] {
        &self.guests
    }

    pub fn current_guest_index(&self) -> Option<usize> {
        match self.step {
            Step::GuestCapture { index } => Some(index),
            _ => None,
        }
    }

    pub fn current_guest(&self) -> Option<&GuestRecord> {
        self.current_guest_index().and_then(|i| self.guests.get(i))
    }

    pub fn template(&self) -> Option<&FileData> {
        self.template.as_ref()
    }

    pub fn recipients(&self) -> &str {
        &self.recipients
    }

    pub fn subject_override(&self) -> &str {
        &self.subject_override
    }

    /// Subject the next dispatch would use.
    pub fn subject(&self) -> String {
        resolve_subject(&self.subject_override, &self.unit_id, &self.guests)
    }

    pub fn is_processing(&self) -> bool {
        matches!(
            self.step,
            Step::ReviewAndSend {
                dispatch: DispatchStatus::Running
            }
        )
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.step {
            Step::ReviewAndSend {
                dispatch: DispatchStatus::Failed { message },
            } => Some(message),
            _ => None,
        }
    }

    pub fn artifacts(&self) -> &[FileData] {
        &self.artifacts
    }

    fn invalid(&self, action: &'static str) -> WizardError {
        log::warn!("Rejected '{}' during the {} step", action, self.step.name());
        WizardError::InvalidTransition {
            action,
            step: self.step.name(),
        }
    }

    fn ensure_not_running(&self) -> Result<(), WizardError> {
        if self.is_processing() {
            return Err(WizardError::Busy);
        }
        Ok(())
    }

    /// Edit the setup fields. Takes effect on the next `advance`.
    pub fn configure(
        &mut self,
        unit_id: Option<String>,
        guest_count: Option<u32>,
    ) -> Result<(), WizardError> {
        if self.step != Step::Setup {
            return Err(self.invalid("edit setup"));
        }
        if let Some(unit_id) = unit_id {
            self.unit_id = unit_id;
        }
        if let Some(guest_count) = guest_count {
            self.guest_count = guest_count;
        }
        Ok(())
    }

    /// The "next" transition for the current step.
    pub fn advance(&mut self) -> Result<(), WizardError> {
        self.ensure_not_running()?;
        let next = match self.step {
            Step::Setup => {
                let mut errors = ValidationErrors::new();
                validate_required(&self.unit_id, "unit_id", "Unit number", &mut errors);
                validate_guest_count(self.guest_count, "guest_count", &mut errors);
                errors.into_result()?;

                // Records at retained positions keep whatever was entered.
                self.guests
                    .resize_with(self.guest_count as usize, GuestRecord::new);
                Step::GuestCapture { index: 0 }
            }
            Step::GuestCapture { index } => {
                let guest = self
                    .guests
                    .get(index)
                    .ok_or_else(|| self.invalid("advance"))?;
                guest.missing_fields().into_result()?;

                if index + 1 < self.guests.len() {
                    Step::GuestCapture { index: index + 1 }
                } else {
                    Step::TemplateUpload
                }
            }
            Step::TemplateUpload => {
                if self.template.is_none() {
                    return Err(
                        ValidationError::missing_document("template", "Form template").into(),
                    );
                }
                Step::ReviewAndSend {
                    dispatch: DispatchStatus::Idle,
                }
            }
            Step::ReviewAndSend { .. } | Step::Done => return Err(self.invalid("advance")),
        };

        log::info!("Wizard step {} -> {}", self.step.name(), next.name());
        self.step = next;
        Ok(())
    }

    /// The "previous" transition for the current step.
    pub fn retreat(&mut self) -> Result<(), WizardError> {
        self.ensure_not_running()?;
        let previous = match self.step {
            Step::GuestCapture { index: 0 } => Step::Setup,
            Step::GuestCapture { index } => Step::GuestCapture { index: index - 1 },
            Step::TemplateUpload => Step::GuestCapture {
                index: self.guests.len().saturating_sub(1),
            },
            Step::ReviewAndSend { .. } => Step::TemplateUpload,
            Step::Setup | Step::Done => return Err(self.invalid("go back")),
        };

        log::info!("Wizard step {} -> {}", self.step.name(), previous.name());
        self.step = previous;
        Ok(())
    }

    pub fn update_current_guest(&mut self, update: GuestUpdate) -> Result<&GuestRecord, WizardError> {
        let index = self
            .current_guest_index()
            .ok_or_else(|| self.invalid("edit a guest"))?;
        let guest = &mut self.guests[index];
        guest.apply(update);
        Ok(guest)
    }

    /// Attach a PDF or image identity document to the current guest.
    pub fn attach_identity_document(&mut self, document: FileData) -> Result<(), WizardError> {
        let index = self
            .current_guest_index()
            .ok_or_else(|| self.invalid("attach an ID document"))?;
        if !is_identity_media_type(&document.media_type) {
            return Err(ValidationError::unsupported_media_type(
                "identity_document",
                &document.media_type,
                "a PDF or an image",
            )
            .into());
        }
        self.guests[index].identity_document = Some(document);
        Ok(())
    }

    pub fn upload_template(&mut self, template: FileData) -> Result<(), WizardError> {
        if self.step != Step::TemplateUpload {
            return Err(self.invalid("upload a template"));
        }
        if !is_pdf_media_type(&template.media_type) {
            return Err(ValidationError::unsupported_media_type(
                "template",
                &template.media_type,
                "a valid PDF file",
            )
            .into());
        }
        log::info!(
            "Template '{}' uploaded ({} bytes)",
            template.filename,
            template.size_bytes()
        );
        self.template = Some(template);
        Ok(())
    }

    pub fn update_email(
        &mut self,
        recipients: Option<String>,
        subject_override: Option<String>,
    ) -> Result<(), WizardError> {
        if !matches!(self.step, Step::ReviewAndSend { .. }) {
            return Err(self.invalid("edit email settings"));
        }
        self.ensure_not_running()?;
        if let Some(recipients) = recipients {
            self.recipients = recipients;
        }
        if let Some(subject_override) = subject_override {
            self.subject_override = subject_override;
        }
        Ok(())
    }

    /// Discard everything and start over.
    pub fn reset(&mut self) {
        if self.is_processing() {
            log::warn!("Session reset while a dispatch is running");
        }
        *self = Self::new();
        log::info!("Session reset");
    }

    /// Mark a dispatch as running and hand out what it needs.
    pub fn begin_dispatch(&mut self) -> Result<DispatchJob, WizardError> {
        if !matches!(self.step, Step::ReviewAndSend { .. }) {
            return Err(self.invalid("send"));
        }
        self.ensure_not_running()?;
        let template = self.template.as_ref().ok_or_else(|| {
            WizardError::from(ValidationError::missing_document("template", "Form template"))
        })?;

        let job = DispatchJob {
            session_id: self.id,
            unit_id: self.unit_id.clone(),
            guests: self.guests.clone(),
            template: template.bytes.clone(),
            recipients: parse_recipients(&self.recipients),
            subject: self.subject(),
        };

        self.artifacts.clear();
        self.step = Step::ReviewAndSend {
            dispatch: DispatchStatus::Running,
        };
        Ok(job)
    }

    /// Replace the retained artifacts with the latest generated files.
    pub fn record_artifacts(&mut self, files: Vec<FileData>) {
        self.artifacts = files;
    }

    pub fn complete_dispatch(&mut self) {
        if self.is_processing() {
            self.step = Step::Done;
        }
    }

    /// Back to review with the recovery message; artifacts stay available.
    pub fn fail_dispatch(&mut self) {
        if self.is_processing() {
            self.step = Step::ReviewAndSend {
                dispatch: DispatchStatus::Failed {
                    message: RECOVERY_MESSAGE.to_string(),
                },
            };
        }
    }

    /// Artifact at `index` for manual download.
    pub fn artifact(&self, index: usize) -> Option<&FileData> {
        self.artifacts.get(index)
    }
}
