//! 权限目录的 HTTP 处理器

use crate::{auth::middleware::AuthContext, error::AppError, middleware::AppState};
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

/// 权限目录全量列表
pub async fn list_permissions(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let permissions = state.role_admin.list_permissions(&auth_context).await?;
    Ok(Json(permissions))
}
