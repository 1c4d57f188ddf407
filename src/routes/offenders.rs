//! Attribution endpoints.
//!
//! - POST /api/v1/offenders { stack_trace: string }
//!   Resolves every source frame and returns a report per frame, in trace order.
//!
//! - GET /api/v1/offenders?path=root/src/Foo.cs&line=42
//!   Offending commits for a single file and line.
//!
//! Both hold the command session for the whole request, off the async workers.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::git::LineAttributor;
use crate::models::{Offender, TraceReport};
use crate::routes::frames::StackTraceRequest;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/offenders", get(line_offenders).post(trace_offenders))
        .with_state(state)
}

async fn trace_offenders(
    State(state): State<AppState>,
    Json(request): Json<StackTraceRequest>,
) -> Result<Json<Vec<TraceReport>>> {
    let resolver = state.resolver.clone();
    let reports = state
        .with_session(move |runner| {
            LineAttributor::new(runner).attribute_stack_trace(&resolver, &request.stack_trace)
        })
        .await?;
    Ok(Json(reports))
}

#[derive(Debug, Deserialize)]
struct LineQuery {
    path: String,
    line: u32,
}

async fn line_offenders(
    State(state): State<AppState>,
    Query(query): Query<LineQuery>,
) -> Result<Json<Vec<Offender>>> {
    let offenders = state
        .with_session(move |runner| LineAttributor::new(runner).attribute(&query.path, query.line))
        .await?;
    Ok(Json(offenders))
}
