//! 角色管理的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::role::{CreateOrUpdateRoleRequest, ListRolesParams, UpdatePermissionsRequest},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// 列出角色（分页，可按名称过滤）
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(params): Query<ListRolesParams>,
) -> Result<impl IntoResponse, AppError> {
    let roles = state
        .role_admin
        .list(
            &auth_context,
            params.name.as_deref(),
            params.limit.unwrap_or(50),
            params.offset.unwrap_or(0),
        )
        .await?;

    Ok(Json(json!({
        "roles": roles,
        "count": roles.len()
    })))
}

/// 创建角色
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<CreateOrUpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = state.role_admin.create_role(&auth_context, req).await?;

    Ok(Json(json!({
        "message": "角色创建成功",
        "role": role
    })))
}

/// 获取角色详情
pub async fn get_role(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let role = state.role_admin.find_by_id(&auth_context, id).await?;
    Ok(Json(role))
}

/// 更新角色（名称/显示名；权限集会被清空）
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateOrUpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = state.role_admin.update_role(&auth_context, id, req).await?;

    Ok(Json(json!({
        "message": "角色更新成功，权限已清空，请重新分配",
        "role": role
    })))
}

/// 删除角色
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.role_admin.delete_role(&auth_context, id).await?;

    Ok(Json(json!({
        "message": "角色删除成功"
    })))
}

/// 整体替换角色权限集
pub async fn replace_permissions(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePermissionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = state
        .role_admin
        .update_permissions(&auth_context, id, req.permission_ids)
        .await?;

    Ok(Json(json!({
        "message": "角色权限更新成功",
        "role": role
    })))
}

/// 目录中尚未分配给该角色的权限
pub async fn available_permissions(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = state
        .role_admin
        .find_available_permissions(&auth_context, id)
        .await?;

    Ok(Json(permissions))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRoleNameParams {
    pub role_name: String,
}

/// 角色名是否已被占用（管理界面轮询）
pub async fn validate_role_name(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Query(params): Query<ValidateRoleNameParams>,
) -> Result<impl IntoResponse, AppError> {
    let taken = state.role_admin.is_role_name_taken(&params.role_name).await?;
    Ok(Json(taken))
}

/// 角色名是否已被其它角色占用
pub async fn validate_role_name_not_self(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Query(params): Query<ValidateRoleNameParams>,
) -> Result<impl IntoResponse, AppError> {
    let taken = state
        .role_admin
        .is_role_name_taken_by_other(&params.role_name, id)
        .await?;
    Ok(Json(taken))
}
