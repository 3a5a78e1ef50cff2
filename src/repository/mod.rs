//! Database repository layer
//! 存储协作者的 trait 定义与 Postgres / 内存两套实现

pub mod client_repo;
pub mod memory;
pub mod role_repo;
pub mod store;
pub mod user_repo;

pub use client_repo::PgClientStore;
pub use memory::{MemoryClientStore, MemoryPermissionCatalog, MemoryRoleStore, MemoryUserDirectory};
pub use role_repo::{PgPermissionCatalog, PgRoleStore};
pub use store::{ClientStore, PermissionCatalog, RoleStore, UserDirectory};
pub use user_repo::PgUserDirectory;
