//! 角色管理服务
//! 角色的增删改、权限集替换与层级缓存重建的编排。
//! 每个变更操作完成持久化后同步重建层级缓存，重建先于返回，
//! 保证其后的授权决策读到最新的角色/权限图。

use crate::{
    auth::{AuthContext, ROLE_ADMIN, ROLE_ADMIN_READ},
    error::AppError,
    hierarchy::RoleHierarchy,
    models::role::{CreateOrUpdateRoleRequest, Permission, Role},
    repository::store::{PermissionCatalog, RoleStore, UserDirectory},
    services::require_any_authority,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct RoleAdminService {
    roles: Arc<dyn RoleStore>,
    catalog: Arc<dyn PermissionCatalog>,
    users: Arc<dyn UserDirectory>,
    hierarchy: Arc<RoleHierarchy>,
}

impl RoleAdminService {
    pub fn new(
        roles: Arc<dyn RoleStore>,
        catalog: Arc<dyn PermissionCatalog>,
        users: Arc<dyn UserDirectory>,
        hierarchy: Arc<RoleHierarchy>,
    ) -> Self {
        Self {
            roles,
            catalog,
            users,
            hierarchy,
        }
    }

    /// 创建角色：名称归一化大写，空权限集，非内置
    ///
    /// 预检查只缩小竞态窗口，存储唯一约束的冲突同样翻译为 `DuplicateRoleName`。
    pub async fn create_role(
        &self,
        ctx: &AuthContext,
        req: CreateOrUpdateRoleRequest,
    ) -> Result<Role, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;
        req.validate()?;

        let name = Role::normalize_name(&req.role_name);
        if self.roles.find_by_name(&name).await?.is_some() {
            return Err(AppError::DuplicateRoleName(name));
        }

        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            name,
            display_name: req.display_name,
            built_in: false,
            permissions: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let saved = self.roles.insert(&role).await?;
        self.hierarchy.rebuild(self.roles.as_ref()).await?;

        tracing::info!(role = %saved.name, "Role created");
        Ok(saved)
    }

    /// 更新角色名称与显示名
    ///
    /// 更新会同时清空该角色的权限集：这是沿袭下来的既定行为，
    /// 调用方必须在更新后通过 `update_permissions` 重新分配权限。
    pub async fn update_role(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        req: CreateOrUpdateRoleRequest,
    ) -> Result<Role, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;
        req.validate()?;

        let name = Role::normalize_name(&req.role_name);
        if let Some(existing) = self.roles.find_by_name(&name).await? {
            if existing.id != id {
                return Err(AppError::DuplicateRoleName(name));
            }
        }

        let role = self
            .roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("role".to_string()))?;

        let updated = Role {
            name,
            display_name: req.display_name,
            permissions: Vec::new(),
            updated_at: Utc::now(),
            ..role
        };

        let saved = self.roles.update(&updated).await?;
        self.hierarchy.rebuild(self.roles.as_ref()).await?;

        tracing::info!(role = %saved.name, "Role updated, permission set cleared");
        Ok(saved)
    }

    /// 删除角色
    ///
    /// 内置角色无条件拒绝（与分配状态无关）；仍被分配的角色拒绝；
    /// id 不存在时静默成功（幂等删除）。
    pub async fn delete_role(&self, ctx: &AuthContext, id: Uuid) -> Result<(), AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;

        if let Some(role) = self.roles.find_by_id(id).await? {
            if role.built_in {
                return Err(AppError::BuiltInRole);
            }
            if self.users.is_role_assigned(id).await? {
                return Err(AppError::RoleInUse);
            }
            self.roles.delete(id).await?;
            tracing::info!(role = %role.name, "Role deleted");
        }

        // 删除路径无条件重建，与源行为一致
        self.hierarchy.rebuild(self.roles.as_ref()).await?;
        Ok(())
    }

    /// 整体替换角色的权限集
    ///
    /// 目录中不存在的权限 id 静默丢弃，不视为错误。
    pub async fn update_permissions(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        permission_ids: Vec<Uuid>,
    ) -> Result<Role, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;

        let role = self
            .roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("role".to_string()))?;

        let filtered = self.catalog.find_by_ids(&permission_ids).await?;

        let updated = Role {
            permissions: filtered,
            updated_at: Utc::now(),
            ..role
        };

        let saved = self.roles.update(&updated).await?;
        self.hierarchy.rebuild(self.roles.as_ref()).await?;

        Ok(saved)
    }

    /// 目录中尚未分配给该角色的权限，按 authority 串做差集
    pub async fn find_available_permissions(
        &self,
        ctx: &AuthContext,
        id: Uuid,
    ) -> Result<Vec<Permission>, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN, ROLE_ADMIN_READ])?;

        let role = self
            .roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("role".to_string()))?;

        let assigned: HashSet<&str> =
            role.permissions.iter().map(|p| p.authority.as_str()).collect();

        Ok(self
            .catalog
            .all()
            .await?
            .into_iter()
            .filter(|p| !assigned.contains(p.authority.as_str()))
            .collect())
    }

    pub async fn find_by_id(&self, ctx: &AuthContext, id: Uuid) -> Result<Role, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN, ROLE_ADMIN_READ])?;

        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("role".to_string()))
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        name_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Role>, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN, ROLE_ADMIN_READ])?;

        self.roles.list(name_filter, limit, offset).await
    }

    /// 权限目录全量列表
    pub async fn list_permissions(&self, ctx: &AuthContext) -> Result<Vec<Permission>, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN, ROLE_ADMIN_READ])?;

        self.catalog.all().await
    }

    /// 名称是否已被占用（管理界面的校验接口）
    pub async fn is_role_name_taken(&self, name: &str) -> Result<bool, AppError> {
        let name = Role::normalize_name(name);
        Ok(self.roles.find_by_name(&name).await?.is_some())
    }

    /// 名称是否已被其它角色占用
    pub async fn is_role_name_taken_by_other(
        &self,
        name: &str,
        id: Uuid,
    ) -> Result<bool, AppError> {
        let name = Role::normalize_name(name);
        Ok(self
            .roles
            .find_by_name(&name)
            .await?
            .is_some_and(|role| role.id != id))
    }
}
