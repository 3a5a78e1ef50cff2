//! 客户端注册两步协议的集成测试

use secrecy::Secret;
use uaa_admin::{
    error::AppError,
    models::client::{ClientResponse, CreateOrUpdateClientRequest},
};

mod common;
use common::{admin_ctx, create_test_state, plain_ctx};

fn client_request(client_id: &str, secret: &str) -> CreateOrUpdateClientRequest {
    CreateOrUpdateClientRequest {
        client_id: client_id.to_string(),
        client_secret: Secret::new(secret.to_string()),
        scopes: vec!["read".to_string(), "write".to_string()],
        grant_types: vec!["authorization_code".to_string(), "refresh_token".to_string()],
        redirect_uris: vec!["https://example.com/callback".to_string()],
        access_token_validity_secs: Some(600),
        refresh_token_validity_secs: Some(86_400),
        auto_approve_scopes: None,
    }
}

#[tokio::test]
async fn test_add_client_completes_both_steps() {
    let (state, _stores) = create_test_state();
    let ctx = admin_ctx();

    let client = state
        .client_admin
        .add_client(&ctx, client_request("web-app", "s3cret"))
        .await
        .unwrap();

    assert!(client.is_complete());
    // auto-approve 缺省归一化为空集，不是 null
    assert!(client.auto_approve_scopes.is_empty());
    assert_eq!(client.access_token_validity_secs, 600);

    assert!(state
        .client_admin
        .verify_secret("web-app", &Secret::new("s3cret".to_string()))
        .await
        .unwrap());
    assert!(!state
        .client_admin
        .verify_secret("web-app", &Secret::new("wrong".to_string()))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_add_client_duplicate_id() {
    let (state, _stores) = create_test_state();
    let ctx = admin_ctx();

    state
        .client_admin
        .add_client(&ctx, client_request("web-app", "s3cret"))
        .await
        .unwrap();

    let result = state
        .client_admin
        .add_client(&ctx, client_request("web-app", "other"))
        .await;

    assert!(matches!(result, Err(AppError::DuplicateClientId(_))));
}

#[tokio::test]
async fn test_add_client_requires_admin() {
    let (state, _stores) = create_test_state();

    let result = state
        .client_admin
        .add_client(&plain_ctx(), client_request("web-app", "s3cret"))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_secret_step_failure_leaves_incomplete_client() {
    let (state, stores) = create_test_state();
    let ctx = admin_ctx();

    // 注入第二步写入故障：详情落库，密钥失败
    stores.clients.inject_secret_failure();

    let result = state
        .client_admin
        .add_client(&ctx, client_request("web-app", "s3cret"))
        .await;

    match result {
        Err(AppError::IncompleteClient { client_id }) => assert_eq!(client_id, "web-app"),
        other => panic!("expected IncompleteClient, got {:?}", other.map(|c| c.client_id)),
    }

    // 详情仍可通过列表读到，但处于不完整状态
    let clients = state.client_admin.list_clients(&ctx).await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].client_id, "web-app");
    assert!(!clients[0].is_complete());
    assert_eq!(clients[0].scopes, vec!["read".to_string(), "write".to_string()]);

    // 不完整客户端不能通过任何密钥校验
    assert!(!state
        .client_admin
        .verify_secret("web-app", &Secret::new("s3cret".to_string()))
        .await
        .unwrap());

    // 只重试密钥步骤即可转为完整，无需重新创建
    let client = state
        .client_admin
        .set_client_secret(&ctx, "web-app", &Secret::new("s3cret".to_string()))
        .await
        .unwrap();
    assert!(client.is_complete());

    assert!(state
        .client_admin
        .verify_secret("web-app", &Secret::new("s3cret".to_string()))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_update_client_rotates_secret_and_details() {
    let (state, _stores) = create_test_state();
    let ctx = admin_ctx();

    state
        .client_admin
        .add_client(&ctx, client_request("web-app", "old-secret"))
        .await
        .unwrap();

    let mut req = client_request("web-app", "new-secret");
    req.scopes = vec!["read".to_string()];
    req.auto_approve_scopes = Some(vec!["read".to_string()]);

    let updated = state
        .client_admin
        .update_client(&ctx, "web-app", req)
        .await
        .unwrap();

    assert_eq!(updated.scopes, vec!["read".to_string()]);
    assert_eq!(updated.auto_approve_scopes, vec!["read".to_string()]);

    assert!(!state
        .client_admin
        .verify_secret("web-app", &Secret::new("old-secret".to_string()))
        .await
        .unwrap());
    assert!(state
        .client_admin
        .verify_secret("web-app", &Secret::new("new-secret".to_string()))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_update_missing_client_not_found() {
    let (state, _stores) = create_test_state();

    let result = state
        .client_admin
        .update_client(&admin_ctx(), "ghost", client_request("ghost", "x"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_client_is_idempotent() {
    let (state, _stores) = create_test_state();
    let ctx = admin_ctx();

    state
        .client_admin
        .add_client(&ctx, client_request("web-app", "s3cret"))
        .await
        .unwrap();

    state.client_admin.delete_client(&ctx, "web-app").await.unwrap();
    // 再删一次仍然成功
    state.client_admin.delete_client(&ctx, "web-app").await.unwrap();

    assert!(state.client_admin.list_clients(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_read_path_never_exposes_secret() {
    let (state, _stores) = create_test_state();
    let ctx = admin_ctx();

    let client = state
        .client_admin
        .add_client(&ctx, client_request("web-app", "super-s3cret-value"))
        .await
        .unwrap();
    let stored_hash = client.secret_hash.clone().unwrap();

    let listed = state.client_admin.list_clients(&ctx).await.unwrap();
    let response = ClientResponse::from(listed.into_iter().next().unwrap());
    let serialized = serde_json::to_string(&response).unwrap();

    assert!(!serialized.contains("super-s3cret-value"));
    assert!(!serialized.contains(&stored_hash));
    assert!(!serialized.contains("secret_hash"));
    assert!(serialized.contains("\"complete\":true"));
}
