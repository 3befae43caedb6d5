use crate::application::TestGenerationUseCase;
use crate::domain::error::AppError;
use crate::domain::generation::{GeneratedCase, GeneratedCode, ProcessCandidate, ProcessMatch, ScenarioInput};
use crate::domain::llm_config::{CompletionConfig, GenerationLimits};
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

pub struct HttpState {
    pub generation: Arc<TestGenerationUseCase>,
    pub completion: CompletionConfig,
    pub limits: GenerationLimits,
}

#[derive(Deserialize)]
pub struct GenerateTestsRequest {
    pub scenarios: Vec<ScenarioInput>,
    #[serde(default)]
    pub completion: Option<CompletionConfig>,
    #[serde(default)]
    pub limits: Option<GenerationLimits>,
}

#[derive(Serialize)]
struct GenerateTestsResponse {
    ok: bool,
    test_cases: Vec<GeneratedCase>,
}

#[derive(Deserialize)]
pub struct MatchProcessesRequest {
    pub document_text: String,
    pub candidates: Vec<ProcessCandidate>,
    #[serde(default)]
    pub completion: Option<CompletionConfig>,
}

#[derive(Serialize)]
struct MatchProcessesResponse {
    ok: bool,
    matches: Vec<ProcessMatch>,
}

#[derive(Deserialize)]
pub struct GenerateCodeRequest {
    pub scenarios: Vec<ScenarioInput>,
    #[serde(default = "default_framework")]
    pub framework: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub completion: Option<CompletionConfig>,
}

fn default_framework() -> String {
    "JUnit".to_string()
}

fn default_language() -> String {
    "Java".to_string()
}

#[derive(Serialize)]
struct GenerateCodeResponse {
    ok: bool,
    codes: Vec<GeneratedCode>,
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
}

#[post("/generate-tests")]
async fn generate_tests(
    data: web::Data<HttpState>,
    req: web::Json<GenerateTestsRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let completion = req.completion.unwrap_or_else(|| data.completion.clone());
    let limits = req.limits.unwrap_or_else(|| data.limits.clone());

    info!(scenarios = req.scenarios.len(), "generating test cases");

    match data
        .generation
        .generate_test_cases(&completion, &limits, &req.scenarios)
        .await
    {
        Ok(test_cases) => HttpResponse::Ok().json(GenerateTestsResponse {
            ok: true,
            test_cases,
        }),
        Err(err) => error_response(err),
    }
}

#[post("/match-processes")]
async fn match_processes(
    data: web::Data<HttpState>,
    req: web::Json<MatchProcessesRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let completion = req.completion.unwrap_or_else(|| data.completion.clone());

    info!(candidates = req.candidates.len(), "matching processes");

    match data
        .generation
        .match_processes(&completion, &req.document_text, &req.candidates)
        .await
    {
        Ok(matches) => HttpResponse::Ok().json(MatchProcessesResponse { ok: true, matches }),
        Err(err) => error_response(err),
    }
}

#[post("/generate-code")]
async fn generate_code(
    data: web::Data<HttpState>,
    req: web::Json<GenerateCodeRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let completion = req.completion.unwrap_or_else(|| data.completion.clone());

    info!(
        scenarios = req.scenarios.len(),
        framework = %req.framework,
        "generating test code"
    );

    match data
        .generation
        .generate_test_code(&completion, &req.framework, &req.language, &req.scenarios)
        .await
    {
        Ok(codes) => HttpResponse::Ok().json(GenerateCodeResponse { ok: true, codes }),
        Err(err) => error_response(err),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

fn error_response(err: AppError) -> HttpResponse {
    match err {
        AppError::ValidationError(message) => HttpResponse::BadRequest().json(ErrorBody {
            ok: false,
            error: message,
        }),
        other => {
            error!(error = %other, "request failed");
            HttpResponse::InternalServerError().json(ErrorBody {
                ok: false,
                error: other.to_string(),
            })
        }
    }
}

pub fn start_server(state: HttpState, bind_addr: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .service(generate_tests)
                    .service(match_processes)
                    .service(generate_code),
            )
            .service(health)
    })
    .bind((bind_addr, port))?
    .run();

    Ok(server)
}
