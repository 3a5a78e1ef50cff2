//! 错误处理单元测试
//!
//! 校验错误分类到 HTTP 状态码的映射与对外消息

use axum::http::StatusCode;
use uaa_admin::error::AppError;

// ==================== 错误状态码测试 ====================

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        AppError::NotFound("role".to_string()).status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::BadRequest("invalid".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::Validation("error".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn test_conflict_family_maps_to_409() {
    assert_eq!(
        AppError::DuplicateRoleName("EDITOR".to_string()).status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::DuplicateClientId("web-app".to_string()).status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(AppError::BuiltInRole.status_code(), StatusCode::CONFLICT);
    assert_eq!(AppError::RoleInUse.status_code(), StatusCode::CONFLICT);
}

#[test]
fn test_incomplete_client_maps_to_207() {
    let err = AppError::IncompleteClient {
        client_id: "web-app".to_string(),
    };
    assert_eq!(err.status_code(), StatusCode::MULTI_STATUS);
    // 部分失败的消息要指引调用方重试密钥步骤
    assert!(err.user_message().contains("web-app"));
    assert!(err.user_message().contains("密钥"));
}

#[test]
fn test_infrastructure_errors_map_to_500() {
    assert_eq!(
        AppError::Database(sqlx::Error::RowNotFound).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Config("bad".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Internal("boom".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// ==================== 用户消息测试 ====================

#[test]
fn test_user_messages_no_sensitive_info() {
    // 数据库错误不应该暴露技术细节
    let message = AppError::Database(sqlx::Error::RowNotFound).user_message();
    assert_eq!(message, "Database error occurred");
    assert!(!message.to_lowercase().contains("sqlx"));
    assert!(!message.to_lowercase().contains("row"));

    // 配置错误不应暴露配置内容
    let message = AppError::Config("jwt_secret=...".to_string()).user_message();
    assert_eq!(message, "Configuration error");
    assert!(!message.contains("jwt_secret"));
}

#[test]
fn test_user_messages_for_domain_conflicts() {
    assert!(AppError::DuplicateRoleName("EDITOR".to_string())
        .user_message()
        .contains("角色名称已存在"));
    assert!(AppError::BuiltInRole.user_message().contains("内置角色"));
    assert!(AppError::RoleInUse.user_message().contains("已经分配"));
}
