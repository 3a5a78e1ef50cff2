//! 健康检查处理器

use crate::middleware::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

static START_TIME: OnceCell<Instant> = OnceCell::new();

/// 记录进程启动时间
pub fn set_start_time() {
    let _ = START_TIME.set(Instant::now());
}

/// 进程运行时长（秒）
pub fn get_uptime() -> u64 {
    START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// 存活检查
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": get_uptime(),
    }))
}

/// 就绪检查：有数据库时探测数据库连通性，层级缓存须已完成首次重建
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if let Some(pool) = &state.db {
        if !crate::db::health_check(pool).await {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "reason": "database" })),
            );
        }
        crate::db::record_pool_metrics(pool);
    }

    if state.hierarchy.version() == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "reason": "role hierarchy not built" })),
        );
    }

    (StatusCode::OK, Json(json!({ "status": "ready" })))
}
