//! 用户管理的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::user::{ListUsersParams, UpdateUserRolesRequest},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(params): Query<ListUsersParams>,
) -> Result<impl IntoResponse, AppError> {
    let users = state
        .user_admin
        .list(
            &auth_context,
            params.limit.unwrap_or(50),
            params.offset.unwrap_or(0),
        )
        .await?;

    Ok(Json(json!({
        "users": users,
        "count": users.len()
    })))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_admin
        .find_by_username(&auth_context, &username)
        .await?;
    Ok(Json(user))
}

/// 切换用户启用状态
pub async fn toggle_user_enabled(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_admin
        .toggle_enabled(&auth_context, &username)
        .await?;

    Ok(Json(json!({
        "message": "用户状态更新成功",
        "user": user
    })))
}

/// 整体替换用户角色集
pub async fn update_user_roles(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(username): Path<String>,
    Json(req): Json<UpdateUserRolesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_admin
        .update_roles(&auth_context, &username, req.role_ids)
        .await?;

    Ok(Json(json!({
        "message": "用户角色更新成功",
        "user": user
    })))
}

/// 尚未分配给该用户的角色
pub async fn available_roles(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let roles = state
        .user_admin
        .find_available_roles(&auth_context, &username)
        .await?;
    Ok(Json(roles))
}
