//! 指标处理器
//! 提供 /metrics 端点

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::middleware::AppState;

/// 指标响应
#[derive(Serialize)]
pub struct MetricsResponse {
    pub role_hierarchy_version: u64,
    pub db_pool_size: u32,
    pub db_pool_idle: u32,
    pub process_uptime_secs: u64,
}

/// 指标暴露端点
pub async fn metrics_export(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    let (db_pool_size, db_pool_idle) = match &state.db {
        Some(pool) => (pool.size(), pool.num_idle() as u32),
        None => (0, 0),
    };

    Json(MetricsResponse {
        role_hierarchy_version: state.hierarchy.version(),
        db_pool_size,
        db_pool_idle,
        process_uptime_secs: crate::handlers::health::get_uptime(),
    })
}
