use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use shuttle_axum::axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::assemble::{self, Role};
use crate::catalog::{Catalog, Platform, Service};
use crate::error::ApiError;
use crate::pipeline::{AnalysisReport, Pipeline, PipelineError, ANALYSIS_FAILED_ERROR};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, catalog: Catalog) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            catalog: Arc::new(catalog),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/api/sentiment/analyze-normal/{platform}",
            post(analyze_normal),
        )
        .route(
            "/api/sentiment/analyze-with-location/{platform}/{location}",
            post(analyze_with_location),
        )
        .route(
            "/api/sentiment/analyze-playstore/{app_id}",
            post(analyze_playstore),
        )
        .route("/api/services", get(list_services))
        .route("/api/platforms", get(list_platforms))
        .route("/api/platforms/{id}", get(platform_details))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Run an analysis on its own task. A panic inside it is logged and replaced
/// by `fallback()`.
async fn guarded<T, F>(fut: F, fallback: impl FnOnce() -> T) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, PipelineError>> + Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(res) => res.map_err(ApiError::from),
        Err(e) => {
            tracing::error!(error = %e, "analysis task failed");
            counter!("analyses_degraded_total", "kind" => "panic").increment(1);
            Ok(fallback())
        }
    }
}

fn failed_report() -> AnalysisReport {
    AnalysisReport::degraded(ANALYSIS_FAILED_ERROR)
}

async fn analyze_normal(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let pipeline = Arc::clone(&state.pipeline);
    let report = guarded(async move { pipeline.analyze(&platform).await }, failed_report).await?;
    Ok(Json(assemble::assemble_flat(Role::News, &report)))
}

async fn analyze_with_location(
    State(state): State<AppState>,
    Path((platform, location)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let pipeline = Arc::clone(&state.pipeline);
    let report = guarded(
        async move { pipeline.analyze_with_location(&platform, &location).await },
        failed_report,
    )
    .await?;
    Ok(Json(assemble::assemble_flat(Role::News, &report)))
}

async fn analyze_playstore(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let pipeline = Arc::clone(&state.pipeline);
    let report = guarded(
        async move { pipeline.analyze_app_reviews(&app_id).await },
        failed_report,
    )
    .await?;
    Ok(Json(assemble::assemble_flat(Role::Reviews, &report)))
}

async fn list_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    Json(state.catalog.services().to_vec())
}

async fn list_platforms(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Platform>>, ApiError> {
    let service = q
        .get("service")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::MissingParameter("Service parameter is required".into()))?;

    let out = state
        .catalog
        .platforms_for_service(service)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(out))
}

async fn platform_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let platform = state
        .catalog
        .find(&id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Platform not found".into()))?;

    let pipeline = Arc::clone(&state.pipeline);
    let target = platform.clone();
    let (news, reviews) = guarded(
        async move { Ok::<_, PipelineError>(pipeline.platform_report(&target).await) },
        || (failed_report(), failed_report()),
    )
    .await?;

    Ok(Json(assemble::assemble(
        Some(&platform),
        &[(Role::News, &news), (Role::Reviews, &reviews)],
    )))
}
