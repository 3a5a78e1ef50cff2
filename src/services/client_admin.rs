//! 客户端注册服务
//! 两步注册协议：先写详情，再写密钥。第二步失败不回滚第一步，
//! 以 `IncompleteClient` 向调用方暴露部分失败，支持只重试密钥步骤。

use crate::{
    auth::{AuthContext, SecretHasher, ROLE_ADMIN, ROLE_ADMIN_READ},
    error::AppError,
    hierarchy::RoleHierarchy,
    models::client::{Client, CreateOrUpdateClientRequest},
    repository::store::ClientStore,
    services::require_any_authority,
};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use validator::Validate;

pub struct ClientAdminService {
    clients: Arc<dyn ClientStore>,
    hierarchy: Arc<RoleHierarchy>,
    secrets: SecretHasher,
}

impl ClientAdminService {
    pub fn new(clients: Arc<dyn ClientStore>, hierarchy: Arc<RoleHierarchy>) -> Self {
        Self {
            clients,
            hierarchy,
            secrets: SecretHasher::new(),
        }
    }

    /// 注册客户端
    ///
    /// 第一步落详情（auto-approve 缺省归一化为空集），第二步写密钥哈希。
    /// 第二步失败返回 `IncompleteClient`：记录已存在但不能通过密钥校验，
    /// 调用方应通过 `set_client_secret` 重试而不是重新创建。
    pub async fn add_client(
        &self,
        ctx: &AuthContext,
        req: CreateOrUpdateClientRequest,
    ) -> Result<Client, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;
        req.validate()?;

        let details = Client::from_request(&req);
        self.clients.insert_details(&details).await?;

        self.write_secret(&details.client_id, &req.client_secret).await?;

        tracing::info!(client_id = %details.client_id, "Client registered");
        self.find_or_not_found(&details.client_id).await
    }

    /// 更新客户端详情并轮换密钥，两步形态与注册一致
    pub async fn update_client(
        &self,
        ctx: &AuthContext,
        client_id: &str,
        req: CreateOrUpdateClientRequest,
    ) -> Result<Client, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;
        req.validate()?;

        let mut details = Client::from_request(&req);
        details.client_id = client_id.to_string();

        if !self.clients.update_details(&details).await? {
            return Err(AppError::NotFound("client".to_string()));
        }

        self.write_secret(client_id, &req.client_secret).await?;

        tracing::info!(client_id = %client_id, "Client updated");
        self.find_or_not_found(client_id).await
    }

    /// 单独设置/轮换密钥：两步协议第二步的重试入口
    pub async fn set_client_secret(
        &self,
        ctx: &AuthContext,
        client_id: &str,
        secret: &Secret<String>,
    ) -> Result<Client, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;

        let hash = self.secrets.hash(secret.expose_secret())?;
        if !self.clients.set_secret(client_id, &hash).await? {
            return Err(AppError::NotFound("client".to_string()));
        }

        tracing::info!(client_id = %client_id, "Client secret set");
        self.find_or_not_found(client_id).await
    }

    /// 幂等删除
    pub async fn delete_client(&self, ctx: &AuthContext, client_id: &str) -> Result<(), AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN])?;

        if self.clients.delete(client_id).await? {
            tracing::info!(client_id = %client_id, "Client deleted");
        }
        Ok(())
    }

    /// 客户端列表，密钥永不出现在读路径
    pub async fn list_clients(&self, ctx: &AuthContext) -> Result<Vec<Client>, AppError> {
        require_any_authority(&self.hierarchy, ctx, &[ROLE_ADMIN, ROLE_ADMIN_READ])?;

        self.clients.list().await
    }

    /// 校验候选密钥
    ///
    /// 不完整客户端（密钥步骤未完成）一律不通过，无论候选值是什么。
    pub async fn verify_secret(
        &self,
        client_id: &str,
        candidate: &Secret<String>,
    ) -> Result<bool, AppError> {
        let client = self
            .clients
            .find(client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("client".to_string()))?;

        match client.secret_hash {
            Some(hash) => self.secrets.verify(candidate.expose_secret(), &hash),
            None => Ok(false),
        }
    }

    /// 第二步：哈希并写入密钥，失败时以 `IncompleteClient` 暴露部分失败
    async fn write_secret(
        &self,
        client_id: &str,
        secret: &Secret<String>,
    ) -> Result<(), AppError> {
        let hash = self.secrets.hash(secret.expose_secret()).map_err(|e| {
            tracing::error!(client_id = %client_id, error = %e, "Client secret step failed");
            AppError::IncompleteClient {
                client_id: client_id.to_string(),
            }
        })?;

        match self.clients.set_secret(client_id, &hash).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("client".to_string())),
            Err(e) => {
                tracing::error!(client_id = %client_id, error = %e, "Client secret step failed");
                Err(AppError::IncompleteClient {
                    client_id: client_id.to_string(),
                })
            }
        }
    }

    async fn find_or_not_found(&self, client_id: &str) -> Result<Client, AppError> {
        self.clients
            .find(client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("client".to_string()))
    }
}
