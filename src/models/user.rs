//! 用户模型
//! 用户实体本身由外部系统管理，这里只承载管理面需要的字段与角色分配

use crate::models::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 用户及其当前角色集
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<Role>,
}

/// 替换用户角色集请求
#[derive(Debug, Deserialize)]
pub struct UpdateUserRolesRequest {
    pub role_ids: Vec<Uuid>,
}

/// 用户列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
