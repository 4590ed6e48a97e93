use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::models::ErrorKind;
use crate::state::AppState;

/// Caps the whole request at `REQUEST_TIMEOUT_SECS`. The handler future is dropped
/// on expiry, so the cut-off is counted here as a timeout failure.
pub async fn enforce_request_timeout(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.config.request_timeout;
    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => Ok(response),
        Err(_) => {
            state.stats.record_failure(ErrorKind::Timeout);
            Err(AppError::RequestTimeout(limit))
        }
    }
}
