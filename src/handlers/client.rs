//! 客户端注册的 HTTP 处理器
//! 响应一律通过 ClientResponse 投影，密钥不会出现在任何读路径

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::client::{ClientResponse, CreateOrUpdateClientRequest, SetClientSecretRequest},
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 客户端列表
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let clients: Vec<ClientResponse> = state
        .client_admin
        .list_clients(&auth_context)
        .await?
        .into_iter()
        .map(ClientResponse::from)
        .collect();

    Ok(Json(json!({
        "clients": clients,
        "count": clients.len()
    })))
}

/// 注册客户端（两步协议）
pub async fn add_client(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<CreateOrUpdateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = state.client_admin.add_client(&auth_context, req).await?;

    Ok(Json(json!({
        "message": "客户端创建成功",
        "client": ClientResponse::from(client)
    })))
}

/// 更新客户端
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(client_id): Path<String>,
    Json(req): Json<CreateOrUpdateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = state
        .client_admin
        .update_client(&auth_context, &client_id, req)
        .await?;

    Ok(Json(json!({
        "message": "客户端更新成功",
        "client": ClientResponse::from(client)
    })))
}

/// 设置/轮换客户端密钥（两步协议第二步的重试入口）
pub async fn set_client_secret(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(client_id): Path<String>,
    Json(req): Json<SetClientSecretRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = state
        .client_admin
        .set_client_secret(&auth_context, &client_id, &req.client_secret)
        .await?;

    Ok(Json(json!({
        "message": "客户端密钥设置成功",
        "client": ClientResponse::from(client)
    })))
}

/// 删除客户端（幂等）
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(client_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .client_admin
        .delete_client(&auth_context, &client_id)
        .await?;

    Ok(Json(json!({
        "message": "客户端删除成功"
    })))
}
