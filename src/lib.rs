use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpResponse, HttpServer, Responder};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod attachment;
pub mod config;
pub mod dispatch;
pub mod form_fill;
pub mod guest;
pub mod state;
pub mod validation;
pub mod wizard;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

use crate::validation::{ValidationError, ValidationErrors};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Per-field problems, present for validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationError>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            details: errors.errors().to_vec(),
            ..Self::new("ValidationError", &errors.to_string())
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::wizard::handlers::get_session,
        crate::wizard::handlers::update_setup,
        crate::wizard::handlers::next_step,
        crate::wizard::handlers::previous_step,
        crate::wizard::handlers::update_current_guest,
        crate::wizard::handlers::upload_identity_document,
        crate::wizard::handlers::upload_template,
        crate::wizard::handlers::update_email,
        crate::wizard::handlers::dispatch_registration,
        crate::wizard::handlers::reset_session,
        crate::wizard::handlers::download_artifact
    ),
    components(
        schemas(
            wizard::SessionView,
            wizard::SetupRequest,
            wizard::EmailConfigRequest,
            guest::GuestUpdate,
            guest::GuestView,
            attachment::ArtifactInfo,
            attachment::Attachment,
            dispatch::OutboundMessage,
            ValidationError,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Registration Wizard", description = "Guest registration session endpoints.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost")
    )
)]
pub struct ApiDoc;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("Guest registration server is running")
}

/// Register the application's routes on an `App` or test service.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health))
        .service(web::scope("/api").configure(wizard::config));
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let app_state = web::Data::new(AppState::new(config.clone())?);

    let prometheus = PrometheusMetricsBuilder::new("guest_registration_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
