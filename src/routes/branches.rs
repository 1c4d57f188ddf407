//! Branch and working-copy endpoints.
//!
//! - GET /api/v1/repository/branches
//!   Lists all local and remote branches with current branch flagged.
//!
//! - POST /api/v1/repository/checkout { branch: string }
//!   Force-switches the session's working copy to a branch and verifies it.
//!
//! - POST /api/v1/repository/stash, POST /api/v1/repository/pull
//!   Run `git stash` / `git pull` in the session and return their output.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::git::RepositoryAdmin;
use crate::models::BranchInfo;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repository/branches", get(list_branches))
        .route("/api/v1/repository/checkout", post(checkout_branch))
        .route("/api/v1/repository/stash", post(stash))
        .route("/api/v1/repository/pull", post(pull))
        .with_state(state)
}

async fn list_branches(State(state): State<AppState>) -> Result<Json<Vec<BranchInfo>>> {
    let branches = state.repo.list_branches()?;
    Ok(Json(branches))
}

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    branch: String,
}

async fn checkout_branch(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<()>> {
    state
        .with_session(move |runner| RepositoryAdmin::new(runner).switch_branch(&request.branch))
        .await?;
    Ok(Json(()))
}

#[derive(Debug, Serialize)]
struct CommandOutput {
    output: Vec<String>,
}

async fn stash(State(state): State<AppState>) -> Result<Json<CommandOutput>> {
    let output = state
        .with_session(|runner| RepositoryAdmin::new(runner).stash())
        .await?;
    Ok(Json(CommandOutput { output }))
}

async fn pull(State(state): State<AppState>) -> Result<Json<CommandOutput>> {
    let output = state
        .with_session(|runner| RepositoryAdmin::new(runner).pull())
        .await?;
    Ok(Json(CommandOutput { output }))
}
