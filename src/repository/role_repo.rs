//! Role repository (角色与权限目录的 Postgres 实现)

use crate::{
    error::AppError,
    models::role::{Permission, Role},
    repository::store::{PermissionCatalog, RoleStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Postgres 唯一约束冲突（23505）翻译为领域错误，其余原样包装
pub(crate) fn map_unique_violation(err: sqlx::Error, conflict: AppError) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => conflict,
        _ => AppError::Database(err),
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    display_name: String,
    built_in: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    id: Uuid,
    authority: String,
    display_name: String,
}

impl RoleRow {
    fn into_role(self, permissions: Vec<Permission>) -> Role {
        Role {
            id: self.id,
            name: self.name,
            display_name: self.display_name,
            built_in: self.built_in,
            permissions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub struct PgRoleStore {
    db: PgPool,
}

impl PgRoleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 给一批角色行挂上各自的权限集
    async fn attach_permissions(&self, rows: Vec<RoleRow>) -> Result<Vec<Role>, AppError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let permission_rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT rp.role_id, p.id, p.authority, p.display_name
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = ANY($1)
            ORDER BY p.authority
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        let mut by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
        for row in permission_rows {
            by_role.entry(row.role_id).or_default().push(Permission {
                id: row.id,
                authority: row.authority,
                display_name: row.display_name,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let permissions = by_role.remove(&row.id).unwrap_or_default();
                row.into_role(permissions)
            })
            .collect())
    }

    async fn fetch_one(&self, row: Option<RoleRow>) -> Result<Option<Role>, AppError> {
        match row {
            Some(row) => {
                let mut roles = self.attach_permissions(vec![row]).await?;
                Ok(roles.pop())
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn all(&self) -> Result<Vec<Role>, AppError> {
        let rows = sqlx::query_as::<_, RoleRow>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.db)
            .await?;

        self.attach_permissions(rows).await
    }

    async fn list(
        &self,
        name_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Role>, AppError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT * FROM roles
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(name_filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        self.attach_permissions(rows).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        self.fetch_one(row).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.db)
            .await?;

        self.fetch_one(row).await
    }

    async fn insert(&self, role: &Role) -> Result<Role, AppError> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO roles (id, name, display_name, built_in, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.display_name)
        .bind(role.built_in)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, AppError::DuplicateRoleName(role.name.clone())))?;

        for permission in &role.permissions {
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
                .bind(role.id)
                .bind(permission.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_by_id(role.id)
            .await?
            .ok_or_else(|| AppError::NotFound("role".to_string()))
    }

    async fn update(&self, role: &Role) -> Result<Role, AppError> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, display_name = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.display_name)
        .bind(role.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, AppError::DuplicateRoleName(role.name.clone())))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("role".to_string()));
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role.id)
            .execute(&mut *tx)
            .await?;

        for permission in &role.permissions {
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
                .bind(role.id)
                .bind(permission.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_by_id(role.id)
            .await?
            .ok_or_else(|| AppError::NotFound("role".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct PgPermissionCatalog {
    db: PgPool,
}

impl PgPermissionCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PermissionCatalog for PgPermissionCatalog {
    async fn all(&self) -> Result<Vec<Permission>, AppError> {
        let permissions =
            sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY authority")
                .fetch_all(&self.db)
                .await?;

        Ok(permissions)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE id = ANY($1) ORDER BY authority",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }
}
