use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.catalog.read().await;

    Json(json!({
        "status": "healthy",
        "service": "ykk-bom-workbench",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "boms": catalog.headers().len(),
            "draftApi": if state.drafts.has_remote() { "remote" } else { "local-only" },
        }
    }))
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.render()
}
