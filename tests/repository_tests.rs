//! 仓库层测试
//! 内存实现直接测试；Postgres 实现的往返测试需要数据库，默认忽略

use chrono::Utc;
use uaa_admin::{
    error::AppError,
    models::{client::Client, role::Role},
    repository::{
        store::{ClientStore, RoleStore, UserDirectory},
        MemoryClientStore, MemoryRoleStore, MemoryUserDirectory,
    },
};
use uuid::Uuid;

mod common;

fn new_role(name: &str) -> Role {
    let now = Utc::now();
    Role {
        id: Uuid::new_v4(),
        name: Role::normalize_name(name),
        display_name: name.to_string(),
        built_in: false,
        permissions: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn new_client(client_id: &str) -> Client {
    let now = Utc::now();
    Client {
        client_id: client_id.to_string(),
        secret_hash: None,
        scopes: vec!["read".to_string()],
        grant_types: vec!["authorization_code".to_string()],
        redirect_uris: Vec::new(),
        access_token_validity_secs: 900,
        refresh_token_validity_secs: 604_800,
        auto_approve_scopes: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_memory_role_store_enforces_name_uniqueness() {
    let store = MemoryRoleStore::new();
    store.insert(&new_role("EDITOR")).await.unwrap();

    // 即使绕过服务层预检查，存储本身也拒绝重名
    let result = store.insert(&new_role("EDITOR")).await;
    assert!(matches!(result, Err(AppError::DuplicateRoleName(_))));

    let mut other = new_role("AUDITOR");
    store.insert(&other).await.unwrap();
    other.name = "EDITOR".to_string();
    let result = store.update(&other).await;
    assert!(matches!(result, Err(AppError::DuplicateRoleName(_))));
}

#[tokio::test]
async fn test_memory_role_store_update_missing_is_not_found() {
    let store = MemoryRoleStore::new();
    let result = store.update(&new_role("GHOST")).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_memory_client_store_update_details_preserves_secret() {
    let store = MemoryClientStore::new();
    let client = new_client("web-app");
    store.insert_details(&client).await.unwrap();
    store.set_secret("web-app", "hash-1").await.unwrap();

    // 详情更新不触碰密钥列
    let mut updated = new_client("web-app");
    updated.scopes = vec!["write".to_string()];
    assert!(store.update_details(&updated).await.unwrap());

    let stored = store.find("web-app").await.unwrap().unwrap();
    assert_eq!(stored.secret_hash.as_deref(), Some("hash-1"));
    assert_eq!(stored.scopes, vec!["write".to_string()]);
}

#[tokio::test]
async fn test_memory_client_store_set_secret_on_missing_client() {
    let store = MemoryClientStore::new();
    assert!(!store.set_secret("ghost", "hash").await.unwrap());
}

#[tokio::test]
async fn test_memory_user_directory_role_assignment_lookup() {
    let roles = std::sync::Arc::new(MemoryRoleStore::new());
    let role = new_role("EDITOR");
    roles.insert(&role).await.unwrap();

    let users = MemoryUserDirectory::new(roles.clone());
    let user_id = common::create_test_user(&users, "alice").await;

    assert!(!users.is_role_assigned(role.id).await.unwrap());

    users.replace_roles(user_id, &[role.id]).await.unwrap();
    assert!(users.is_role_assigned(role.id).await.unwrap());

    let assigned = users.roles_of(user_id).await.unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].name, "EDITOR");

    users.replace_roles(user_id, &[]).await.unwrap();
    assert!(!users.is_role_assigned(role.id).await.unwrap());
}

// ==================== Postgres 实现（需要数据库） ====================

#[tokio::test]
#[ignore] // 需要数据库：设置 TEST_DATABASE_URL 后运行
async fn test_pg_role_store_roundtrip() {
    use uaa_admin::repository::PgRoleStore;

    let config = common::create_test_config();
    let pool = uaa_admin::db::create_pool(&config.database)
        .await
        .expect("Failed to create test database pool");
    uaa_admin::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let store = PgRoleStore::new(pool);
    let name = format!("TEST_{}", Uuid::new_v4().simple());
    let role = new_role(&name);

    let saved = store.insert(&role).await.unwrap();
    assert_eq!(saved.name, role.name);

    let found = store.find_by_name(&role.name).await.unwrap();
    assert!(found.is_some());

    let duplicate = store.insert(&new_role(&name)).await;
    assert!(matches!(duplicate, Err(AppError::DuplicateRoleName(_))));

    assert!(store.delete(role.id).await.unwrap());
}

#[tokio::test]
#[ignore] // 需要数据库：设置 TEST_DATABASE_URL 后运行
async fn test_pg_client_store_roundtrip() {
    use uaa_admin::repository::PgClientStore;

    let config = common::create_test_config();
    let pool = uaa_admin::db::create_pool(&config.database)
        .await
        .expect("Failed to create test database pool");
    uaa_admin::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let store = PgClientStore::new(pool);
    let client_id = format!("client-{}", Uuid::new_v4().simple());
    let client = new_client(&client_id);

    store.insert_details(&client).await.unwrap();
    let stored = store.find(&client_id).await.unwrap().unwrap();
    assert!(!stored.is_complete());

    assert!(store.set_secret(&client_id, "hash-1").await.unwrap());
    let stored = store.find(&client_id).await.unwrap().unwrap();
    assert!(stored.is_complete());

    assert!(store.delete(&client_id).await.unwrap());
    assert!(!store.delete(&client_id).await.unwrap());
}
