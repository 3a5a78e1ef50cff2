//! User repository (用户目录与角色分配的 Postgres 实现)

use crate::{
    error::AppError,
    models::{role::Role, user::User},
    repository::{
        role_repo::PgRoleStore,
        store::{RoleStore, UserDirectory},
    },
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY username LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, AppError> {
        let role_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.db)
                .await?;

        let role_store = PgRoleStore::new(self.db.clone());
        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            if let Some(role) = role_store.find_by_id(role_id).await? {
                roles.push(role);
            }
        }
        roles.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(roles)
    }

    async fn is_role_assigned(&self, role_id: Uuid) -> Result<bool, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count > 0)
    }

    async fn replace_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for role_id in role_ids {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id, assigned_at) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(role_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE users SET enabled = $2, updated_at = $3 WHERE id = $1")
                .bind(user_id)
                .bind(enabled)
                .bind(Utc::now())
                .execute(&self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, enabled, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.enabled)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
