//! 路由注册
//! 创建所有 API 路由，并通过过滤器链装配把各处理阶段按契约位置叠上去

use axum::{
    http::StatusCode,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    chain::{self, SecurityFilterChain},
    error::AppError,
    handlers,
    middleware::AppState,
};

/// 创建应用路由
///
/// 过滤器链装配失败（未知锚点、重复阶段）直接报配置错误，进程不应启动。
pub fn create_router(state: Arc<AppState>) -> Result<Router, AppError> {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 管理端点，统一挂在 /admin 下，由授权决策阶段守卫
    let admin_routes = Router::new()
        // 角色管理
        .route(
            "/admin/roles",
            get(handlers::role::list_roles).post(handlers::role::create_role),
        )
        .route(
            "/admin/roles/{id}",
            get(handlers::role::get_role)
                .put(handlers::role::update_role)
                .delete(handlers::role::delete_role),
        )
        .route(
            "/admin/roles/{id}/permissions",
            put(handlers::role::replace_permissions),
        )
        .route(
            "/admin/roles/{id}/permissions/available",
            get(handlers::role::available_permissions),
        )
        // 权限目录
        .route("/admin/permissions", get(handlers::permission::list_permissions))
        // 客户端注册
        .route(
            "/admin/clients",
            get(handlers::client::list_clients).post(handlers::client::add_client),
        )
        .route(
            "/admin/clients/{client_id}",
            put(handlers::client::update_client).delete(handlers::client::delete_client),
        )
        .route(
            "/admin/clients/{client_id}/secret",
            put(handlers::client::set_client_secret),
        )
        // 用户管理
        .route("/admin/users", get(handlers::user::list_users))
        .route("/admin/users/{username}", get(handlers::user::get_user))
        .route(
            "/admin/users/{username}/enabled",
            put(handlers::user::toggle_user_enabled),
        )
        .route(
            "/admin/users/{username}/roles",
            put(handlers::user::update_user_roles),
        )
        .route(
            "/admin/users/{username}/roles/available",
            get(handlers::user::available_roles),
        )
        // 管理界面校验
        .route(
            "/admin/validation/role-name",
            get(handlers::role::validate_role_name),
        )
        .route(
            "/admin/validation/roles/{id}/role-name",
            get(handlers::role::validate_role_name_not_self),
        );

    // 指标端点
    let metrics_routes = Router::new().route("/metrics", get(handlers::metrics::metrics_export));

    let router = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state.clone());

    // 过滤器链装配：决策日志阶段必须紧跟授权决策阶段之后，
    // 这样它观察到的是访问控制决策的结果状态码
    let statuses: Vec<StatusCode> = state
        .config
        .security
        .decision_log_statuses
        .iter()
        .filter_map(|code| StatusCode::from_u16(*code).ok())
        .collect();

    let filter_chain = SecurityFilterChain::new()
        .append(chain::authorization_decision_stage(state.clone()))
        .insert_after(
            chain::decision_logging_stage(statuses),
            chain::AUTHORIZATION_DECISION,
        )?
        .append(chain::authentication_stage(state.jwt_service.clone()))
        .append(chain::request_tracking_stage());

    Ok(filter_chain.into_router(router))
}
