//! Role and permission domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

/// Permission
///
/// 权限目录中的一项，由迁移播种，运行期只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    pub id: Uuid,
    /// 唯一的权限标识串，作为集合运算的键
    pub authority: String,
    pub display_name: String,
}

/// Role
///
/// 角色名大小写不敏感，持久化前统一转为大写。
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub built_in: bool,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// 角色名归一化：去除首尾空白并转大写
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_uppercase()
    }

    /// 该角色蕴含的 authority 集合：角色名本身加上已分配权限（扁平蕴含）
    pub fn authorities(&self) -> HashSet<String> {
        let mut set: HashSet<String> =
            self.permissions.iter().map(|p| p.authority.clone()).collect();
        set.insert(self.name.clone());
        set
    }
}

/// 创建/更新角色请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrUpdateRoleRequest {
    #[validate(length(min = 1, max = 50))]
    pub role_name: String,
    #[validate(length(max = 128))]
    pub display_name: String,
}

/// 角色列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListRolesParams {
    /// 按名称模糊过滤（大小写不敏感）
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// 替换角色权限集请求
#[derive(Debug, Deserialize)]
pub struct UpdatePermissionsRequest {
    pub permission_ids: Vec<Uuid>,
}
