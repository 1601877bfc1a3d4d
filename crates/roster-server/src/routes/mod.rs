pub mod health;
pub mod students;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(students::routes())
        .merge(health::routes())
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct RouteNotFound {
    error: &'static str,
    path: String,
}

async fn route_not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: "Route not found",
            path: uri.path().to_string(),
        }),
    )
        .into_response()
}
