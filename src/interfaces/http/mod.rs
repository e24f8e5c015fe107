use crate::application::use_cases::onboarding::OnboardingUseCase;
use crate::application::use_cases::publish::PublishUseCase;
use crate::domain::error::{AppError, Result};
use crate::domain::onboarding::OnboardingRequest;
use crate::domain::template::{OnboardingContext, TemplateEdits};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::sample::{load_sample_bytes, parse_delimiter};
use crate::infrastructure::vcs::GitHubPublisher;
use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

pub struct HttpState {
    pub config: Arc<AppConfig>,
    pub onboarding: OnboardingUseCase,
}

impl HttpState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            onboarding: OnboardingUseCase::new(config.clone()),
            config,
        }
    }
}

/// Sample file sent inline with a request
#[derive(Debug, Deserialize)]
pub struct SampleUpload {
    pub file_name: String,
    pub content_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingPayload {
    pub request: OnboardingRequest,
    pub sample: SampleUpload,
    #[serde(default)]
    pub edits: TemplateEdits,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

fn error_response(e: &AppError) -> HttpResponse {
    let body = e.to_string();
    match e {
        AppError::ValidationError(_) | AppError::ParseError(_) | AppError::EmptyMetadata => {
            HttpResponse::BadRequest().body(body)
        }
        AppError::PublishError(_) => HttpResponse::BadGateway().body(body),
        _ => HttpResponse::InternalServerError().body(body),
    }
}

fn load_context(state: &HttpState, payload: &OnboardingPayload) -> Result<OnboardingContext> {
    let bytes = STANDARD
        .decode(payload.sample.content_base64.trim())
        .map_err(|e| AppError::ValidationError(format!("Sample is not valid base64: {}", e)))?;

    let sample = load_sample_bytes(
        &payload.sample.file_name,
        bytes,
        parse_delimiter(&payload.request.delmtr_cd),
    )?;
    state.onboarding.prepare(payload.request.clone(), &sample)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[post("/template")]
async fn template(
    data: web::Data<HttpState>,
    payload: web::Json<OnboardingPayload>,
) -> impl Responder {
    info!(file = %payload.sample.file_name, "Building template");

    match load_context(&data, &payload) {
        Ok(ctx) => HttpResponse::Ok().json(ctx),
        Err(e) => {
            error!(error = %e, "Template build failed");
            error_response(&e)
        }
    }
}

#[post("/scripts")]
async fn scripts(
    data: web::Data<HttpState>,
    payload: web::Json<OnboardingPayload>,
) -> impl Responder {
    info!(file = %payload.sample.file_name, "Generating scripts");

    let result = load_context(&data, &payload).and_then(|mut ctx| {
        data.onboarding
            .generate(&mut ctx, &payload.edits)
            .cloned()
    });

    match result {
        Ok(generated) => HttpResponse::Ok().json(generated),
        Err(e) => {
            error!(error = %e, "Script generation failed");
            error_response(&e)
        }
    }
}

#[post("/package")]
async fn package(
    data: web::Data<HttpState>,
    payload: web::Json<OnboardingPayload>,
) -> impl Responder {
    info!(file = %payload.sample.file_name, "Packaging artifacts");

    let result = load_context(&data, &payload).and_then(|mut ctx| {
        data.onboarding.generate(&mut ctx, &payload.edits)?;
        data.onboarding.package(&mut ctx)
    });

    match result {
        Ok((archive_name, bytes)) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", archive_name),
            ))
            .body(bytes),
        Err(e) => {
            error!(error = %e, "Packaging failed");
            error_response(&e)
        }
    }
}

#[post("/publish")]
async fn publish(
    data: web::Data<HttpState>,
    payload: web::Json<OnboardingPayload>,
) -> impl Responder {
    info!(file = %payload.sample.file_name, "Publishing artifacts");

    let prepared = load_context(&data, &payload).and_then(|mut ctx| {
        let generated = data.onboarding.generate(&mut ctx, &payload.edits)?.clone();
        let publisher = GitHubPublisher::from_config(&data.config.publish)?;
        Ok((ctx, generated, publisher))
    });

    let result = match prepared {
        Ok((ctx, generated, publisher)) => {
            PublishUseCase::new(Arc::new(publisher), &data.config.publish.target_branch)
                .execute(&ctx.request.naming(), &generated)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            error!(error = %e, "Publish failed");
            error_response(&e)
        }
    }
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(template)
        .service(scripts)
        .service(package)
        .service(publish);
}

pub fn start_server(config: Arc<AppConfig>) -> std::io::Result<Server> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let state = web::Data::new(HttpState::new(config));

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Local tool, any origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(32 * 1024 * 1024))
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run();

    info!(host = %host, port, "HTTP service listening");
    Ok(server)
}
