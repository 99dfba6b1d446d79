//! 健康检查

use crate::{db, middleware::AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// 健康检查（含数据库连通性）
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = db::health_check(&state.db).await;
    db::record_pool_metrics(&state.db);

    let healthy = db_status.is_healthy();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "database": if healthy { "up" } else { "down" },
        })),
    )
}
