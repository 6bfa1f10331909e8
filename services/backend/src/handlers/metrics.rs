use axum::{extract::State, response::IntoResponse, response::Response};

use crate::state::AppState;

pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => "Metrics recorder not installed".into_response(),
    }
}
