use crate::dedup::remove_duplicates;
use crate::document::{DocId, Document, DocumentStatus};
use crate::engine::SearchEngine;
use crate::error::SearchError;
use crate::request_queue::RequestQueue;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// ========== Shared State ==========

/// The engine plus its request log. The core engine is single-threaded, so
/// the HTTP layer serializes every call behind one lock.
pub struct AppState {
    engine: SearchEngine,
    requests: RequestQueue,
}

impl AppState {
    pub fn new(engine: SearchEngine) -> Self {
        Self {
            engine,
            requests: RequestQueue::new(),
        }
    }
}

pub type SharedState = Arc<RwLock<AppState>>;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct AddDocumentRequest {
    pub id: DocId,
    pub text: String,
    pub status: DocumentStatus,
    pub ratings: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub documents: Vec<Document>,
    pub total: usize,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub words: Vec<String>,
    pub status: DocumentStatus,
}

#[derive(Debug, Serialize)]
pub struct DeduplicateResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_documents: usize,
    pub total_terms: usize,
    pub total_postings: usize,
    pub avg_docs_per_term: f64,
    pub no_result_requests: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Error Handling ==========

struct ApiError(SearchError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SearchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SearchError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        };
        let message = self.0.to_string();
        tracing::error!("API error: {}", message);

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn add_document(
    State(state): State<SharedState>,
    Json(req): Json<AddDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut state = state.write().unwrap();
    state
        .engine
        .add_document(req.id, &req.text, req.status, &req.ratings)?;

    Ok(Json(ApiResponse::success("Document added successfully")))
}

async fn remove_document(
    State(state): State<SharedState>,
    Path(id): Path<DocId>,
) -> impl IntoResponse {
    // removal of an unknown id is a no-op, so this endpoint is idempotent
    state.write().unwrap().engine.remove_document(id);
    Json(ApiResponse::success("Document removed successfully"))
}

async fn search_documents(
    State(state): State<SharedState>,
    Query(req): Query<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut guard = state.write().unwrap();
    let AppState { engine, requests } = &mut *guard;

    let documents = match req.status {
        Some(status) => requests.add_find_request_by_status(engine, &req.query, status)?,
        None => requests.add_find_request(engine, &req.query)?,
    };

    let response = SearchResponse {
        total: documents.len(),
        documents,
        query: req.query,
    };
    Ok(Json(ApiResponse::success(response)))
}

async fn match_document(
    State(state): State<SharedState>,
    Path(id): Path<DocId>,
    Query(req): Query<MatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state.read().unwrap();
    let (words, status) = state.engine.match_document(&req.query, id)?;

    Ok(Json(ApiResponse::success(MatchResponse { words, status })))
}

async fn get_word_frequencies(
    State(state): State<SharedState>,
    Path(id): Path<DocId>,
) -> impl IntoResponse {
    let frequencies: BTreeMap<String, f64> = state.read().unwrap().engine.word_frequencies(id);
    Json(ApiResponse::success(frequencies))
}

async fn deduplicate(State(state): State<SharedState>) -> impl IntoResponse {
    let mut state = state.write().unwrap();
    let before = state.engine.document_count();
    remove_duplicates(&mut state.engine);
    let removed = before - state.engine.document_count();

    Json(ApiResponse::success(DeduplicateResponse { removed }))
}

async fn get_stats(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().unwrap();
    let index_stats = state.engine.stats();

    let response = StatsResponse {
        total_documents: state.engine.document_count(),
        total_terms: index_stats.total_terms,
        total_postings: index_stats.total_postings,
        avg_docs_per_term: index_stats.avg_docs_per_term,
        no_result_requests: state.requests.no_result_requests(),
    };
    Json(ApiResponse::success(response))
}

// ========== Router ==========

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/documents", post(add_document))
        .route("/documents/deduplicate", post(deduplicate))
        .route("/documents/:id", delete(remove_document))
        .route("/documents/:id/match", get(match_document))
        .route("/documents/:id/frequencies", get(get_word_frequencies))
        .route("/search", get(search_documents))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
