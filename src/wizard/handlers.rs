use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::multipart_parser::MultipartParser;
use super::session::{RegistrationSession, WizardError};
use crate::attachment::ArtifactInfo;
use crate::dispatch::{self, DispatchOutcome};
use crate::guest::{GuestUpdate, GuestView};
use crate::{AppState, ErrorResponse};

/// Everything the operator UI needs to render the current step.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub id: Uuid,
    #[schema(example = "guest_capture")]
    pub step: String,
    pub current_guest_index: Option<usize>,
    #[schema(example = "7A")]
    pub unit_id: String,
    pub guest_count: u32,
    pub guests: Vec<GuestView>,
    /// Filename of the uploaded template
    pub template: Option<String>,
    pub recipients: String,
    pub subject_override: String,
    /// Subject the next dispatch will use
    pub subject: String,
    pub processing: bool,
    pub last_error: Option<String>,
    pub artifacts: Vec<ArtifactInfo>,
}

impl From<&RegistrationSession> for SessionView {
    fn from(session: &RegistrationSession) -> Self {
        Self {
            id: session.id(),
            step: session.step().name().to_string(),
            current_guest_index: session.current_guest_index(),
            unit_id: session.unit_id().to_string(),
            guest_count: session.guest_count(),
            guests: session.guests().iter().map(GuestView::from).collect(),
            template: session.template().map(|t| t.filename.clone()),
            recipients: session.recipients().to_string(),
            subject_override: session.subject_override().to_string(),
            subject: session.subject(),
            processing: session.is_processing(),
            last_error: session.last_error().map(str::to_string),
            artifacts: session
                .artifacts()
                .iter()
                .enumerate()
                .map(|(i, file)| ArtifactInfo::describe(i, file))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetupRequest {
    #[schema(example = "7A")]
    pub unit_id: Option<String>,
    #[schema(example = 2, minimum = 1, maximum = 20)]
    pub guest_count: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailConfigRequest {
    /// Comma-separated recipient addresses
    #[schema(example = "bookings@example.com, reception@example.com")]
    pub recipients: Option<String>,
    /// Leave blank to use the derived subject
    pub subject_override: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadFileRequest {
    #[allow(unused)]
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

impl From<WizardError> for HttpResponse {
    fn from(error: WizardError) -> Self {
        match error {
            WizardError::Validation(errors) => {
                HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
            }
            WizardError::InvalidTransition { .. } => HttpResponse::Conflict()
                .json(ErrorResponse::new("InvalidTransition", &error.to_string())),
            WizardError::Busy => {
                HttpResponse::Conflict().json(ErrorResponse::new("Busy", &error.to_string()))
            }
        }
    }
}

fn view(state: &AppState) -> SessionView {
    SessionView::from(&*state.session.lock())
}

/// Run `op` against the locked session and answer with the updated view.
fn mutate<F>(state: &AppState, op: F) -> HttpResponse
where
    F: FnOnce(&mut RegistrationSession) -> Result<(), WizardError>,
{
    let mut session = state.session.lock();
    match op(&mut *session) {
        Ok(()) => HttpResponse::Ok().json(SessionView::from(&*session)),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session", body = SessionView)
    )
)]
pub async fn get_session(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(view(&data))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    put,
    path = "/session/setup",
    request_body = SetupRequest,
    responses(
        (status = 200, description = "Setup updated", body = SessionView),
        (status = 409, description = "Not on the setup step", body = ErrorResponse)
    )
)]
pub async fn update_setup(
    req: web::Json<SetupRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let req = req.into_inner();
    mutate(&data, |session| session.configure(req.unit_id, req.guest_count))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    post,
    path = "/session/next",
    responses(
        (status = 200, description = "Moved to the next step", body = SessionView),
        (status = 400, description = "Current step is incomplete", body = ErrorResponse),
        (status = 409, description = "No next step from here", body = ErrorResponse)
    )
)]
pub async fn next_step(data: web::Data<AppState>) -> impl Responder {
    mutate(&data, RegistrationSession::advance)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    post,
    path = "/session/previous",
    responses(
        (status = 200, description = "Moved to the previous step", body = SessionView),
        (status = 409, description = "No previous step from here", body = ErrorResponse)
    )
)]
pub async fn previous_step(data: web::Data<AppState>) -> impl Responder {
    mutate(&data, RegistrationSession::retreat)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    put,
    path = "/session/guests/current",
    request_body = GuestUpdate,
    responses(
        (status = 200, description = "Guest updated", body = SessionView),
        (status = 409, description = "Not capturing guests", body = ErrorResponse)
    )
)]
pub async fn update_current_guest(
    req: web::Json<GuestUpdate>,
    data: web::Data<AppState>,
) -> impl Responder {
    let update = req.into_inner();
    mutate(&data, |session| session.update_current_guest(update).map(|_| ()))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    post,
    path = "/session/guests/current/identity-document",
    request_body(content = inline(UploadFileRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "ID document attached", body = SessionView),
        (status = 400, description = "Not a PDF or image", body = ErrorResponse),
        (status = 409, description = "Not capturing guests", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse)
    )
)]
pub async fn upload_identity_document(
    payload: Multipart,
    data: web::Data<AppState>,
) -> HttpResponse {
    let document = match MultipartParser::parse_file(payload, data.config.max_upload_bytes).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Rejected identity document upload: {}", e);
            return e.into();
        }
    };
    mutate(&data, |session| session.attach_identity_document(document))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    post,
    path = "/session/template",
    request_body(content = inline(UploadFileRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Template stored", body = SessionView),
        (status = 400, description = "Not a PDF", body = ErrorResponse),
        (status = 409, description = "Not on the template step", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse)
    )
)]
pub async fn upload_template(payload: Multipart, data: web::Data<AppState>) -> HttpResponse {
    let template = match MultipartParser::parse_file(payload, data.config.max_upload_bytes).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Rejected template upload: {}", e);
            return e.into();
        }
    };
    mutate(&data, |session| session.upload_template(template))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    put,
    path = "/session/email",
    request_body = EmailConfigRequest,
    responses(
        (status = 200, description = "Email settings updated", body = SessionView),
        (status = 409, description = "Not on the review step, or busy", body = ErrorResponse)
    )
)]
pub async fn update_email(
    req: web::Json<EmailConfigRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let req = req.into_inner();
    mutate(&data, |session| {
        session.update_email(req.recipients, req.subject_override)
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    post,
    path = "/session/dispatch",
    responses(
        (status = 200, description = "Forms generated and sent", body = SessionView),
        (status = 409, description = "Not on the review step, or already sending", body = ErrorResponse),
        (status = 502, description = "Sending failed; artifacts are available for download", body = SessionView)
    )
)]
pub async fn dispatch_registration(data: web::Data<AppState>) -> HttpResponse {
    info!("Executing dispatch_registration handler");
    match dispatch::dispatch(&data.session, data.relay.as_ref()).await {
        Ok(DispatchOutcome::Sent { .. }) => HttpResponse::Ok().json(view(&data)),
        Ok(DispatchOutcome::Failed(_)) => HttpResponse::BadGateway().json(view(&data)),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    post,
    path = "/session/reset",
    responses(
        (status = 200, description = "Fresh session", body = SessionView)
    )
)]
pub async fn reset_session(data: web::Data<AppState>) -> impl Responder {
    mutate(&data, |session| {
        session.reset();
        Ok(())
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Registration Wizard",
    get,
    path = "/session/artifacts/{index}",
    responses(
        (status = 200, description = "Artifact bytes with its original media type"),
        (status = 404, description = "No artifact at that index", body = ErrorResponse)
    ),
    params(
        ("index" = usize, Path, description = "Position in the session's artifact list")
    )
)]
pub async fn download_artifact(
    index: web::Path<usize>,
    data: web::Data<AppState>,
) -> impl Responder {
    let index = index.into_inner();
    let session = data.session.lock();
    match session.artifact(index) {
        Some(file) => HttpResponse::Ok()
            .content_type(file.media_type.as_str())
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(file.filename.clone())],
            })
            .body(file.bytes.clone()),
        None => HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
            "No artifact at index {}",
            index
        ))),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/session").route(web::get().to(get_session)))
        .service(web::resource("/session/setup").route(web::put().to(update_setup)))
        .service(web::resource("/session/next").route(web::post().to(next_step)))
        .service(web::resource("/session/previous").route(web::post().to(previous_step)))
        .service(
            web::resource("/session/guests/current").route(web::put().to(update_current_guest)),
        )
        .service(
            web::resource("/session/guests/current/identity-document")
                .route(web::post().to(upload_identity_document)),
        )
        .service(web::resource("/session/template").route(web::post().to(upload_template)))
        .service(web::resource("/session/email").route(web::put().to(update_email)))
        .service(web::resource("/session/dispatch").route(web::post().to(dispatch_registration)))
        .service(web::resource("/session/reset").route(web::post().to(reset_session)))
        .service(
            web::resource("/session/artifacts/{index}").route(web::get().to(download_artifact)),
        );
}
