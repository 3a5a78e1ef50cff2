//! Client repository (OAuth 客户端注册表的 Postgres 实现)

use crate::{
    error::AppError,
    models::client::Client,
    repository::{role_repo::map_unique_violation, store::ClientStore},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PgClientStore {
    db: PgPool,
}

impl PgClientStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn list(&self) -> Result<Vec<Client>, AppError> {
        let clients =
            sqlx::query_as::<_, Client>("SELECT * FROM oauth_clients ORDER BY client_id")
                .fetch_all(&self.db)
                .await?;

        Ok(clients)
    }

    async fn find(&self, client_id: &str) -> Result<Option<Client>, AppError> {
        let client =
            sqlx::query_as::<_, Client>("SELECT * FROM oauth_clients WHERE client_id = $1")
                .bind(client_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(client)
    }

    async fn insert_details(&self, client: &Client) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO oauth_clients
                (client_id, scopes, grant_types, redirect_uris,
                 access_token_validity_secs, refresh_token_validity_secs,
                 auto_approve_scopes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&client.client_id)
        .bind(&client.scopes)
        .bind(&client.grant_types)
        .bind(&client.redirect_uris)
        .bind(client.access_token_validity_secs)
        .bind(client.refresh_token_validity_secs)
        .bind(&client.auto_approve_scopes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| {
            map_unique_violation(e, AppError::DuplicateClientId(client.client_id.clone()))
        })?;

        Ok(())
    }

    async fn update_details(&self, client: &Client) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE oauth_clients
            SET scopes = $2, grant_types = $3, redirect_uris = $4,
                access_token_validity_secs = $5, refresh_token_validity_secs = $6,
                auto_approve_scopes = $7, updated_at = $8
            WHERE client_id = $1
            "#,
        )
        .bind(&client.client_id)
        .bind(&client.scopes)
        .bind(&client.grant_types)
        .bind(&client.redirect_uris)
        .bind(client.access_token_validity_secs)
        .bind(client.refresh_token_validity_secs)
        .bind(&client.auto_approve_scopes)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_secret(&self, client_id: &str, secret_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE oauth_clients SET secret_hash = $2, updated_at = $3 WHERE client_id = $1",
        )
        .bind(client_id)
        .bind(secret_hash)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, client_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM oauth_clients WHERE client_id = $1")
            .bind(client_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
