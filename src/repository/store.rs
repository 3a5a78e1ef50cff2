//! 存储协作者接口
//! 管理核心只依赖这些 trait；唯一约束冲突由实现方翻译为领域错误

use crate::{
    error::AppError,
    models::{client::Client, role::Permission, role::Role, user::User},
};
use async_trait::async_trait;
use uuid::Uuid;

/// 角色存储
///
/// `insert`/`update` 必须把角色名唯一约束的提交时冲突翻译为
/// `AppError::DuplicateRoleName`：应用层的预检查只是降低竞态窗口，
/// 存储的约束才是最终仲裁。
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// 读出全部角色及其权限集（层级缓存重建用）
    async fn all(&self) -> Result<Vec<Role>, AppError>;

    /// 分页列出角色，可按名称模糊过滤
    async fn list(
        &self,
        name_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Role>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError>;

    /// 按归一化后的名称精确查找
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;

    async fn insert(&self, role: &Role) -> Result<Role, AppError>;

    /// 持久化名称、显示名与权限集的替换，整体原子
    async fn update(&self, role: &Role) -> Result<Role, AppError>;

    /// 删除角色；返回是否确有删除
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// 权限目录，运行期只读
#[async_trait]
pub trait PermissionCatalog: Send + Sync {
    async fn all(&self) -> Result<Vec<Permission>, AppError>;

    /// 按 id 批量查找；不存在的 id 直接缺席于结果，不报错
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Permission>, AppError>;
}

/// 客户端注册存储
///
/// 详情与密钥是两次独立写入，对应两步注册协议的两步。
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Client>, AppError>;

    async fn find(&self, client_id: &str) -> Result<Option<Client>, AppError>;

    /// 第一步：写入除密钥外的全部字段；client_id 冲突翻译为
    /// `AppError::DuplicateClientId`
    async fn insert_details(&self, client: &Client) -> Result<(), AppError>;

    /// 更新除密钥外的全部字段；返回记录是否存在
    async fn update_details(&self, client: &Client) -> Result<bool, AppError>;

    /// 第二步：写入密钥哈希；返回记录是否存在
    async fn set_secret(&self, client_id: &str, secret_hash: &str) -> Result<bool, AppError>;

    /// 幂等删除
    async fn delete(&self, client_id: &str) -> Result<bool, AppError>;
}

/// 用户目录与角色分配关系
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// 用户当前持有的角色集
    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, AppError>;

    /// 角色是否仍分配给至少一个用户（deleteRole 的前置检查）
    async fn is_role_assigned(&self, role_id: Uuid) -> Result<bool, AppError>;

    /// 整体替换用户的角色集
    async fn replace_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<(), AppError>;

    async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> Result<bool, AppError>;

    /// 建立用户记录（种子与测试夹具用；用户实体的完整生命周期归外部系统）
    async fn insert(&self, user: &User) -> Result<(), AppError>;
}
