use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use faqmatch_core::{CorpusStats, DocId, Engine, MatchResult, Threshold};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub const DEFAULT_SAMPLE_QUESTIONS: usize = 7;
pub const MAX_SAMPLE_QUESTIONS: usize = 100;

/// JSON error body `{"error": "..."}` with a matching status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Deserialize)]
pub struct AnswerParams {
    pub q: String,
    pub threshold: Option<f32>,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub question: String,
    pub threshold: Option<f32>,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub question: String,
    pub answer: Option<String>,
    pub score: f32,
    pub matched_document_id: Option<DocId>,
    pub matched_question: Option<String>,
    pub confidence: String,
    pub accepted: bool,
}

#[derive(Deserialize)]
pub struct SampleParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize { DEFAULT_SAMPLE_QUESTIONS }

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CorpusStats,
    pub vocabulary_size: usize,
}

#[derive(Serialize)]
pub struct QuestionsResponse {
    pub total: usize,
    pub questions: Vec<String>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    pub question: String,
    pub answer: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

pub fn build_app(engine: Arc<Engine>, request_timeout: Duration) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/answer", get(answer_query).post(answer_json))
        .route("/stats", get(stats_handler))
        .route("/questions", get(questions_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(AppState { engine })
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn answer(engine: &Engine, question: String, threshold: Option<f32>) -> Result<Json<AnswerResponse>, ApiError> {
    let threshold = match threshold {
        Some(t) => Threshold::new(t).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => engine.config().threshold,
    };
    let result: MatchResult = engine.answer_with_threshold(&question, threshold);
    let matched_question = result
        .matched_document_id
        .and_then(|id| engine.document(id))
        .map(|d| d.question.clone());
    Ok(Json(AnswerResponse {
        question,
        confidence: result.confidence().to_string().to_lowercase(),
        accepted: result.is_accepted(),
        answer: result.answer,
        score: result.score,
        matched_document_id: result.matched_document_id,
        matched_question,
    }))
}

pub async fn answer_query(
    State(state): State<AppState>,
    params: Result<Query<AnswerParams>, QueryRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let Query(params) = params?;
    answer(&state.engine, params.q, params.threshold)
}

pub async fn answer_json(
    State(state): State<AppState>,
    req: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let Json(req) = req?;
    answer(&state.engine, req.question, req.threshold)
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse { stats: state.engine.stats(), vocabulary_size: state.engine.vocabulary().len() })
}

pub async fn questions_handler(
    State(state): State<AppState>,
    params: Result<Query<SampleParams>, QueryRejection>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let Query(params) = params?;
    let limit = params.limit.min(MAX_SAMPLE_QUESTIONS);
    let questions = state.engine.sample_questions(limit).map(str::to_string).collect();
    Ok(Json(QuestionsResponse { total: state.engine.len(), questions }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    doc_id: Result<Path<DocId>, PathRejection>,
) -> Result<Json<DocResponse>, ApiError> {
    let Path(doc_id) = doc_id?;
    match state.engine.document(doc_id) {
        Some(doc) => Ok(Json(DocResponse { doc_id, question: doc.question.clone(), answer: doc.answer.clone() })),
        None => Err(ApiError::NotFound(format!("document {doc_id} not found"))),
    }
}
