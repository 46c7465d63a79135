use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::AppState;

/// Liveness probe
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
