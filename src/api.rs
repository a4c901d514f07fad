//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing the store's boundary operations: query, similar
//! sections, statistics, corpus listing, health, and background reload.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with legal questions or section identifiers
//! - **Output**: JSON responses with ranked results, stats, system status
//! - **Endpoints**: `/query`, `/similar/{section}`, `/stats`, `/documents`,
//!   `/health`, `/reload`
//!
//! ## Error Mapping
//! `StoreNotReady` maps to 503, request validation to 400, everything else to
//! 500. `/health` always answers 200 and reports degraded state in the body.

use crate::errors::SearchError;
use crate::stats::IndexStats;
use crate::store::ScoredRecord;
use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// REST API server over the application state
pub struct ApiServer {
    app_state: crate::AppState,
}

/// Search request payload
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Legal question or search query
    pub query: String,
    /// Number of results to return; defaults from configuration
    pub top_k: Option<usize>,
    /// Include similarity scores in the response
    #[serde(default = "default_include_score")]
    pub include_score: bool,
}

fn default_include_score() -> bool {
    true
}

/// Query-string parameters for the similar-sections endpoint
#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub top_k: Option<usize>,
}

/// One result record as serialized to clients
#[derive(Debug, Serialize)]
pub struct SearchResultPayload {
    pub rank: usize,
    /// Omitted entirely (not null) when scores are excluded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub section: String,
    pub title: String,
    pub text: String,
    pub source_file: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
}

impl SearchResultPayload {
    fn from_scored(result: ScoredRecord, include_score: bool) -> Self {
        Self {
            rank: result.rank,
            score: include_score.then_some(result.score),
            section: result.record.section,
            title: result.record.title,
            text: result.record.text,
            source_file: result.record.source_file,
            doc_type: result.record.doc_type,
            part: result.record.part,
        }
    }
}

/// Search response payload
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub results: Vec<SearchResultPayload>,
    pub total_results: usize,
    pub processing_time: f64,
    pub timestamp: String,
}

/// Similar-sections response payload
#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub section: String,
    pub similar_sections: Vec<SearchResultPayload>,
    pub count: usize,
}

/// Statistics response payload
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: IndexStats,
    pub status: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub vector_store_ready: bool,
    pub total_documents: usize,
}

/// Corpus listing response
#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub source_files: Vec<String>,
    pub document_types: HashMap<String, usize>,
    pub total_documents: usize,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: crate::AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server until the process is stopped
    pub async fn run(self) -> crate::Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;

        tracing::info!("Starting API server on {}", bind_addr);

        let app_state = self.app_state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(app_state.clone()))
                .wrap(Condition::new(enable_cors, Cors::permissive()))
                .route("/", web::get().to(index_handler))
                .route("/health", web::get().to(health_handler))
                .route("/stats", web::get().to(stats_handler))
                .route("/documents", web::get().to(documents_handler))
                .route("/query", web::post().to(query_handler))
                .route("/similar/{section}", web::post().to(similar_handler))
                .route("/reload", web::post().to(reload_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| SearchError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run();

        server.await.map_err(|e| SearchError::Internal {
            message: format!("Server error: {}", e),
        })?;

        Ok(())
    }
}

/// Map a search error to its HTTP representation
fn error_response(err: &SearchError) -> HttpResponse {
    let body = serde_json::json!({
        "error": err.to_string(),
        "category": err.category(),
    });
    match err {
        SearchError::StoreNotReady => HttpResponse::ServiceUnavailable().json(body),
        SearchError::ValidationFailed { .. } => HttpResponse::BadRequest().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// Clamp a requested result count into the configured bounds
fn clamp_top_k(requested: Option<usize>, config: &crate::config::SearchConfig) -> usize {
    requested
        .unwrap_or(config.default_top_k)
        .clamp(1, config.max_top_k)
}

/// Root endpoint with API information
async fn index_handler() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Indian Law Assistant API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "stats": "/stats",
        "query": "/query",
    })))
}

/// Search endpoint handler
async fn query_handler(
    app_state: web::Data<crate::AppState>,
    request: web::Json<QueryRequest>,
) -> ActixResult<HttpResponse> {
    let timer = crate::utils::Timer::new("query");
    let config = &app_state.config.search;

    let query = request.query.trim();
    if query.len() < config.min_query_length {
        return Ok(error_response(&SearchError::ValidationFailed {
            field: "query".to_string(),
            reason: format!("Query too short: minimum {} characters", config.min_query_length),
        }));
    }
    if query.len() > config.max_query_length {
        return Ok(error_response(&SearchError::ValidationFailed {
            field: "query".to_string(),
            reason: format!("Query too long: maximum {} characters", config.max_query_length),
        }));
    }

    let top_k = clamp_top_k(request.top_k, config);
    tracing::info!(
        "Processing query: {}",
        crate::utils::TextUtils::truncate(query, 120)
    );

    match app_state.query_engine.search(query, top_k).await {
        Ok(results) => {
            let results: Vec<SearchResultPayload> = results
                .into_iter()
                .map(|r| SearchResultPayload::from_scored(r, request.include_score))
                .collect();
            let elapsed_ms = timer.stop();

            let response = QueryResponse {
                query: query.to_string(),
                total_results: results.len(),
                results,
                processing_time: elapsed_ms as f64 / 1000.0,
                timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            };

            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            tracing::error!("Query failed: {}", e);
            Ok(error_response(&e))
        }
    }
}

/// Similar-sections endpoint handler
async fn similar_handler(
    app_state: web::Data<crate::AppState>,
    section: web::Path<String>,
    params: web::Query<SimilarParams>,
) -> ActixResult<HttpResponse> {
    let section = section.into_inner();
    let top_k = clamp_top_k(params.top_k, &app_state.config.search);

    match app_state.query_engine.similar_to(&section, top_k).await {
        Ok(results) => {
            let similar_sections: Vec<SearchResultPayload> = results
                .into_iter()
                .map(|r| SearchResultPayload::from_scored(r, true))
                .collect();

            Ok(HttpResponse::Ok().json(SimilarResponse {
                section,
                count: similar_sections.len(),
                similar_sections,
            }))
        }
        Err(e) => {
            tracing::error!("Similar-sections lookup failed: {}", e);
            Ok(error_response(&e))
        }
    }
}

/// Statistics endpoint handler
async fn stats_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    match app_state.store.get_stats() {
        Ok(stats) => Ok(HttpResponse::Ok().json(StatsResponse {
            stats,
            status: "ready".to_string(),
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Corpus listing endpoint handler
async fn documents_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    match app_state.store.get_stats() {
        Ok(stats) => Ok(HttpResponse::Ok().json(DocumentsResponse {
            source_files: stats.source_files,
            document_types: stats.document_types,
            total_documents: stats.total_documents,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Health check endpoint handler; always 200, degradation is in the body
async fn health_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let ready = app_state.store.is_ready();
    let total_documents = app_state
        .store
        .get_stats()
        .map(|s| s.total_documents)
        .unwrap_or(0);

    let message = if ready {
        "API is running and vector store is ready"
    } else {
        "API is running but vector store is not ready"
    };

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: if ready { "healthy" } else { "unhealthy" }.to_string(),
        message: message.to_string(),
        vector_store_ready: ready,
        total_documents,
    }))
}

/// Reload endpoint handler: rebuilds the snapshot in the background and
/// returns immediately; the swap happens when the build completes.
async fn reload_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    let store = app_state.store.clone();
    let dataset_dir = app_state.config.corpus.dataset_dir.clone();

    tokio::spawn(async move {
        tracing::info!("Reloading vector store from {:?}", dataset_dir);
        match store.build(&dataset_dir).await {
            Ok(snapshot) => {
                tracing::info!(
                    "Vector store reloaded with {} records",
                    snapshot.records().len()
                );
            }
            Err(e) => {
                tracing::error!("Failed to reload vector store: {}", e);
            }
        }
    });

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Vector store reload initiated in background"
    })))
}
