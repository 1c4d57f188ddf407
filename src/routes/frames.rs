use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::Result;
use crate::models::FrameReference;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/frames", post(resolve_frames))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct StackTraceRequest {
    pub stack_trace: String,
}

async fn resolve_frames(
    State(state): State<AppState>,
    Json(request): Json<StackTraceRequest>,
) -> Result<Json<Vec<FrameReference>>> {
    let frames = state.resolver.resolve_frames(&request.stack_trace)?;
    Ok(Json(frames))
}
