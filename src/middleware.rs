//! HTTP 中间件与应用状态

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::JwtService,
    config::AppConfig,
    hierarchy::RoleHierarchy,
    repository::store::{ClientStore, PermissionCatalog, RoleStore, UserDirectory},
    services::{ClientAdminService, RoleAdminService, UserAdminService},
};

/// 应用状态
///
/// 服务用 Arc 包装在多个请求间共享；存储是 trait 对象，
/// Postgres 与内存实现都能装配进来。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// 内存部署（测试）时为 None
    pub db: Option<PgPool>,
    pub roles: Arc<dyn RoleStore>,
    pub catalog: Arc<dyn PermissionCatalog>,
    pub clients: Arc<dyn ClientStore>,
    pub users: Arc<dyn UserDirectory>,
    pub hierarchy: Arc<RoleHierarchy>,
    pub jwt_service: Arc<JwtService>,
    pub role_admin: Arc<RoleAdminService>,
    pub client_admin: Arc<ClientAdminService>,
    pub user_admin: Arc<UserAdminService>,
}

impl AppState {
    /// 用一组存储实现装配全部服务与进程级层级缓存
    pub fn with_stores(
        config: AppConfig,
        db: Option<PgPool>,
        roles: Arc<dyn RoleStore>,
        catalog: Arc<dyn PermissionCatalog>,
        clients: Arc<dyn ClientStore>,
        users: Arc<dyn UserDirectory>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        let hierarchy = Arc::new(RoleHierarchy::new());

        let role_admin = Arc::new(RoleAdminService::new(
            roles.clone(),
            catalog.clone(),
            users.clone(),
            hierarchy.clone(),
        ));
        let client_admin = Arc::new(ClientAdminService::new(clients.clone(), hierarchy.clone()));
        let user_admin = Arc::new(UserAdminService::new(
            users.clone(),
            roles.clone(),
            hierarchy.clone(),
        ));

        Self {
            config,
            db,
            roles,
            catalog,
            clients,
            users,
            hierarchy,
            jwt_service,
            role_admin,
            client_admin,
            user_admin,
        }
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method.clone(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        let mut response = response;
        if let Ok(value) = trace_id.parse() {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = request_id.parse() {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert_eq!(trace_id, "test-trace-123");

        let headers = HeaderMap::new();
        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }
}
