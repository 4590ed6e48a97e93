//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::assembler::{assemble, assemble_batch, BatchItemResponse, ResumeResponse};
use crate::generation::validation::validate_batch_size;
use crate::models::{ErrorKind, ResumeRequest};
use crate::render::DocumentFormat;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateResumeRequest {
    pub user_input: String,
}

impl From<GenerateResumeRequest> for ResumeRequest {
    fn from(request: GenerateResumeRequest) -> Self {
        ResumeRequest::new(request.user_input)
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderDocumentRequest {
    pub resume: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generate-resume
///
/// Validates the raw text, generates a Chicago-style resume and returns it with timing.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    payload: Result<Json<GenerateResumeRequest>, JsonRejection>,
) -> Result<Json<ResumeResponse>, AppError> {
    state.stats.record_single_request();
    let Json(request) = payload.map_err(|rejection| reject(&state, rejection))?;

    let request_id = Uuid::new_v4();
    let request = ResumeRequest::from(request);
    info!(%request_id, "Resume generation requested");

    let started = Instant::now();
    let outcome = state.generator.run(&request).await;
    state.stats.record_outcome(&outcome);

    let response = assemble(outcome, started.elapsed()).into_response()?;
    info!(
        %request_id,
        "Resume generated in {:.3}s",
        response.processing_time
    );

    Ok(Json(response))
}

/// POST /generate-resume/batch
///
/// Up to 10 independent requests. The response array is aligned with the input;
/// failed items carry an error payload at their position.
pub async fn handle_generate_batch(
    State(state): State<AppState>,
    payload: Result<Json<Vec<GenerateResumeRequest>>, JsonRejection>,
) -> Result<Json<Vec<BatchItemResponse>>, AppError> {
    state.stats.record_batch_request();
    let Json(requests) = payload.map_err(|rejection| reject(&state, rejection))?;
    validate_batch_size(requests.len()).map_err(|e| reject(&state, e))?;
    state.stats.record_batch_items(requests.len());

    let request_id = Uuid::new_v4();
    info!(%request_id, "Batch of {} resumes requested", requests.len());

    let requests: Vec<ResumeRequest> = requests.into_iter().map(ResumeRequest::from).collect();
    let results = state
        .batch
        .run_batch(requests, state.config.batch_concurrency)
        .await?;

    for result in &results {
        state.stats.record_outcome(&result.outcome);
    }

    Ok(Json(assemble_batch(results)))
}

/// Counts a request rejected before any generation started.
fn reject(state: &AppState, error: impl Into<AppError>) -> AppError {
    state.stats.record_failure(ErrorKind::Validation);
    error.into()
}

/// POST /generate-resume/pdf
///
/// Renders resume markdown to a PDF attachment. Nothing is stored.
pub async fn handle_render_pdf(
    State(state): State<AppState>,
    payload: Result<Json<RenderDocumentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    render_download(state, payload, DocumentFormat::Pdf).await
}

/// POST /generate-resume/docx
///
/// Same input as the PDF route, returned as a Word document.
pub async fn handle_render_docx(
    State(state): State<AppState>,
    payload: Result<Json<RenderDocumentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    render_download(state, payload, DocumentFormat::Docx).await
}

async fn render_download(
    state: AppState,
    payload: Result<Json<RenderDocumentRequest>, JsonRejection>,
    format: DocumentFormat,
) -> Result<impl IntoResponse, AppError> {
    state.stats.record_render_request();
    let Json(request) = payload?;

    let renderer = state.renderer.clone();
    let rendered = tokio::task::spawn_blocking(move || renderer.render_as(format, &request.resume))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))?;

    let document = match rendered {
        Ok(document) => {
            state.stats.record_render(true);
            document
        }
        Err(e) => {
            state.stats.record_render(false);
            return Err(e.into());
        }
    };

    match document.page_count() {
        Some(pages) => info!("Rendered {format:?}: {pages} page(s), {} bytes", document.len()),
        None => info!("Rendered {format:?}: {} bytes", document.len()),
    }

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type()),
            (header::CONTENT_DISPOSITION, format.content_disposition()),
        ],
        document.into_bytes(),
    ))
}
