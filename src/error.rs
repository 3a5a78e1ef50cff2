//! 统一错误模型
//! 定义管理核心的错误分类和错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// 角色名称冲突（大小写不敏感），包括提交时的唯一约束冲突
    #[error("Role name already taken: {0}")]
    DuplicateRoleName(String),

    /// 客户端标识冲突
    #[error("Client id already taken: {0}")]
    DuplicateClientId(String),

    /// 内置角色禁止删除
    #[error("Built-in role cannot be deleted")]
    BuiltInRole,

    /// 角色仍分配给用户，禁止删除
    #[error("Role is still assigned to users")]
    RoleInUse,

    /// 两步客户端协议：详情已提交，密钥写入失败
    #[error("Client {client_id} registered without secret")]
    IncompleteClient { client_id: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateRoleName(_)
            | AppError::DuplicateClientId(_)
            | AppError::BuiltInRole
            | AppError::RoleInUse => StatusCode::CONFLICT,
            // 部分失败：详情已落库，密钥步骤可单独重试
            AppError::IncompleteClient { .. } => StatusCode::MULTI_STATUS,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Authentication failed".to_string(),
            AppError::Forbidden => "Access denied".to_string(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::DuplicateRoleName(_) => "角色名称已存在，请修改后再试".to_string(),
            AppError::DuplicateClientId(_) => "客户端标识已存在，请修改后再试".to_string(),
            AppError::BuiltInRole => "该角色为内置角色，不能删除".to_string(),
            AppError::RoleInUse => "该角色已经分配，请先从所有用户移除该角色".to_string(),
            AppError::IncompleteClient { client_id } => {
                format!("客户端 {} 已创建，但密钥写入失败，请重试设置密钥", client_id)
            }
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        // 记录错误日志
        tracing::error!(
            code = self.code(),
            message = %self,
            request_id = %error_response.error.request_id,
            "Application error"
        );

        (status, Json(error_response)).into_response()
    }
}

/// 从 String 转换为 AppError::Config
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Config(s)
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从 validator 校验错误转换
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}
