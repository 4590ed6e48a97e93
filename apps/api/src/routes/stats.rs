use axum::{extract::State, Json};

use crate::state::AppState;
use crate::stats::StatsSnapshot;

/// GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}
