//! Per-session directory history backing the "go back" button.
//!
//! - GET  /api/v1/navigation?session=
//! - POST /api/v1/navigation/push  { session, path }
//! - POST /api/v1/navigation/pop   { session }
//! - POST /api/v1/navigation/reset { session }
//!
//! Each returns the session's stack after the operation.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::NavigationView;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/navigation", get(get_stack))
        .route("/api/v1/navigation/push", post(push))
        .route("/api/v1/navigation/pop", post(pop))
        .route("/api/v1/navigation/reset", post(reset))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SessionParams {
    session: String,
}

#[derive(Debug, Deserialize)]
struct PushRequest {
    session: String,
    path: String,
}

fn view(state: &AppState, session: String, popped: Option<String>) -> Result<Json<NavigationView>> {
    let entries = state.navigation.entries(&session)?;
    Ok(Json(NavigationView { session, entries, popped }))
}

async fn get_stack(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<NavigationView>> {
    view(&state, params.session, None)
}

async fn push(State(state): State<AppState>, Json(request): Json<PushRequest>) -> Result<Json<NavigationView>> {
    state.navigation.push(&request.session, &request.path)?;
    view(&state, request.session, None)
}

async fn pop(State(state): State<AppState>, Json(request): Json<SessionParams>) -> Result<Json<NavigationView>> {
    let popped = state.navigation.pop(&request.session)?;
    view(&state, request.session, popped)
}

async fn reset(State(state): State<AppState>, Json(request): Json<SessionParams>) -> Result<Json<NavigationView>> {
    state.navigation.reset(&request.session)?;
    view(&state, request.session, None)
}
