//! 用户管理服务
//! 用户实体归外部系统所有，这里只管理角色分配与启用状态。
//! 分配关系不影响角色→权限映射，因此不触发层级缓存重建。

use crate::{
    auth::{AuthContext, ROLE_ADMIN, ROLE_ADMIN_READ},
    error::AppError,
    hierarchy::RoleHierarchy,
    models::{role::Role, user::UserWithRoles},
    repository::store::{RoleStore, UserDirectory},
    services::require_any_authority,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct UserAdminService {
    users: Arc<dyn UserDirectory>,
    roles: Arc<dyn RoleStore>,
    hierarchy: Arc<RoleHierarchy>,
}

impl UserAdminService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        roles: Arc<dyn RoleStore>,
        hierarchy: Arc<RoleHierarchy>,
    ) -> Self {
        Self {
            users,
            roles,
            hierarchy,
        }
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserWithRoles>, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN, ROLE_ADMIN_READ])?;

        let users = self.users.list(limit, offset).await?;
        let mut result = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.users.roles_of(user.id).await?;
            result.push(UserWithRoles { user, roles });
        }
        Ok(result)
    }

    pub async fn find_by_username(
        &self,
        ctx: &AuthContext,
        username: &str,
    ) -> Result<UserWithRoles, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN, ROLE_ADMIN_READ])?;

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;
        let roles = self.users.roles_of(user.id).await?;
        Ok(UserWithRoles { user, roles })
    }

    /// 切换启用状态
    pub async fn toggle_enabled(
        &self,
        ctx: &AuthContext,
        username: &str,
    ) -> Result<UserWithRoles, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;

        self.users.set_enabled(user.id, !user.enabled).await?;
        tracing::info!(username = %username, enabled = !user.enabled, "User enabled toggled");

        self.find_by_username(ctx, username).await
    }

    /// 整体替换用户的角色集；不存在的角色 id 静默丢弃
    pub async fn update_roles(
        &self,
        ctx: &AuthContext,
        username: &str,
        role_ids: Vec<Uuid>,
    ) -> Result<UserWithRoles, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;

        let mut filtered = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            if self.roles.find_by_id(role_id).await?.is_some() {
                filtered.push(role_id);
            }
        }

        self.users.replace_roles(user.id, &filtered).await?;
        tracing::info!(username = %username, roles = filtered.len(), "User roles replaced");

        self.find_by_username(ctx, username).await
    }

    /// 尚未分配给该用户的角色，按角色名做差集
    pub async fn find_available_roles(
        &self,
        ctx: &AuthContext,
        username: &str,
    ) -> Result<Vec<Role>, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN, ROLE_ADMIN_READ])?;

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;

        let assigned: HashSet<String> = self
            .users
            .roles_of(user.id)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();

        Ok(self
            .roles
            .all()
            .await?
            .into_iter()
            .filter(|r| !assigned.contains(&r.name))
            .collect())
    }
}
