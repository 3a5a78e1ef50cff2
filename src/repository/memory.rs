//! 内存存储实现
//! 测试与嵌入式部署使用；与 Postgres 实现遵守同一套约束翻译契约

use crate::{
    error::AppError,
    models::{client::Client, role::Permission, role::Role, user::User},
    repository::store::{ClientStore, PermissionCatalog, RoleStore, UserDirectory},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use uuid::Uuid;

/// 内存角色存储
///
/// 名称唯一性在 `write_gate` 下检查并写入，扮演数据库唯一约束的角色。
#[derive(Default)]
pub struct MemoryRoleStore {
    roles: DashMap<Uuid, Role>,
    write_gate: Mutex<()>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_taken_by_other(&self, name: &str, id: Uuid) -> bool {
        self.roles
            .iter()
            .any(|entry| entry.value().name == name && entry.key() != &id)
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn all(&self) -> Result<Vec<Role>, AppError> {
        let mut roles: Vec<Role> = self.roles.iter().map(|e| e.value().clone()).collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn list(
        &self,
        name_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Role>, AppError> {
        let needle = name_filter.map(|f| f.to_uppercase());
        let mut roles: Vec<Role> = self
            .roles
            .iter()
            .filter(|e| match &needle {
                Some(needle) => e.value().name.contains(needle.as_str()),
                None => true,
            })
            .map(|e| e.value().clone())
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(roles
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        Ok(self.roles.get(&id).map(|r| r.clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        Ok(self
            .roles
            .iter()
            .find(|e| e.value().name == name)
            .map(|e| e.value().clone()))
    }

    async fn insert(&self, role: &Role) -> Result<Role, AppError> {
        let _gate = self.write_gate.lock().unwrap_or_else(|e| e.into_inner());

        if self.name_taken_by_other(&role.name, role.id) {
            return Err(AppError::DuplicateRoleName(role.name.clone()));
        }
        self.roles.insert(role.id, role.clone());
        Ok(role.clone())
    }

    async fn update(&self, role: &Role) -> Result<Role, AppError> {
        let _gate = self.write_gate.lock().unwrap_or_else(|e| e.into_inner());

        if !self.roles.contains_key(&role.id) {
            return Err(AppError::NotFound("role".to_string()));
        }
        if self.name_taken_by_other(&role.name, role.id) {
            return Err(AppError::DuplicateRoleName(role.name.clone()));
        }
        self.roles.insert(role.id, role.clone());
        Ok(role.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.roles.remove(&id).is_some())
    }
}

/// 内存权限目录，构造时播种
#[derive(Default)]
pub struct MemoryPermissionCatalog {
    permissions: Vec<Permission>,
}

impl MemoryPermissionCatalog {
    /// 按 authority 列表播种目录
    pub fn seeded(authorities: &[&str]) -> Self {
        let permissions = authorities
            .iter()
            .map(|authority| Permission {
                id: Uuid::new_v4(),
                authority: authority.to_string(),
                display_name: authority.to_string(),
            })
            .collect();
        Self { permissions }
    }
}

#[async_trait]
impl PermissionCatalog for MemoryPermissionCatalog {
    async fn all(&self) -> Result<Vec<Permission>, AppError> {
        Ok(self.permissions.clone())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Permission>, AppError> {
        Ok(self
            .permissions
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

/// 内存客户端存储
///
/// `fail_next_secret_write` 供测试注入两步协议第二步的写入故障。
#[derive(Default)]
pub struct MemoryClientStore {
    clients: DashMap<String, Client>,
    fail_next_secret_write: AtomicBool,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让下一次 `set_secret` 失败一次
    pub fn inject_secret_failure(&self) {
        self.fail_next_secret_write.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn list(&self) -> Result<Vec<Client>, AppError> {
        let mut clients: Vec<Client> = self.clients.iter().map(|e| e.value().clone()).collect();
        clients.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        Ok(clients)
    }

    async fn find(&self, client_id: &str) -> Result<Option<Client>, AppError> {
        Ok(self.clients.get(client_id).map(|c| c.clone()))
    }

    async fn insert_details(&self, client: &Client) -> Result<(), AppError> {
        if self.clients.contains_key(&client.client_id) {
            return Err(AppError::DuplicateClientId(client.client_id.clone()));
        }
        self.clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn update_details(&self, client: &Client) -> Result<bool, AppError> {
        match self.clients.get_mut(&client.client_id) {
            Some(mut existing) => {
                let secret_hash = existing.secret_hash.take();
                let mut updated = client.clone();
                updated.secret_hash = secret_hash;
                updated.created_at = existing.created_at;
                *existing = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_secret(&self, client_id: &str, secret_hash: &str) -> Result<bool, AppError> {
        if self.fail_next_secret_write.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal("secret write failed".to_string()));
        }
        match self.clients.get_mut(client_id) {
            Some(mut client) => {
                client.secret_hash = Some(secret_hash.to_string());
                client.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, client_id: &str) -> Result<bool, AppError> {
        Ok(self.clients.remove(client_id).is_some())
    }
}

/// 内存用户目录，角色集通过共享的角色存储解析
pub struct MemoryUserDirectory {
    users: DashMap<Uuid, User>,
    assignments: DashMap<Uuid, Vec<Uuid>>,
    roles: Arc<dyn RoleStore>,
}

impl MemoryUserDirectory {
    pub fn new(roles: Arc<dyn RoleStore>) -> Self {
        Self {
            users: DashMap::new(),
            assignments: DashMap::new(),
            roles,
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|e| e.value().username == username)
            .map(|e| e.value().clone()))
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, AppError> {
        let role_ids = self
            .assignments
            .get(&user_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();

        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            if let Some(role) = self.roles.find_by_id(role_id).await? {
                roles.push(role);
            }
        }
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn is_role_assigned(&self, role_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .assignments
            .iter()
            .any(|entry| entry.value().contains(&role_id)))
    }

    async fn replace_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<(), AppError> {
        self.assignments.insert(user_id, role_ids.to_vec());
        Ok(())
    }

    async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> Result<bool, AppError> {
        match self.users.get_mut(&user_id) {
            Some(mut user) => {
                user.enabled = enabled;
                user.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }
}
