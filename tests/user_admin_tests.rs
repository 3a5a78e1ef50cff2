//! 用户角色分配管理的集成测试

use uaa_admin::{error::AppError, models::role::CreateOrUpdateRoleRequest};
use uuid::Uuid;

mod common;
use common::{admin_ctx, create_test_state, create_test_user, plain_ctx};

async fn create_role(
    state: &uaa_admin::middleware::AppState,
    name: &str,
) -> uaa_admin::models::role::Role {
    state
        .role_admin
        .create_role(
            &admin_ctx(),
            CreateOrUpdateRoleRequest {
                role_name: name.to_string(),
                display_name: name.to_string(),
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_update_roles_filters_unknown_ids() {
    let (state, stores) = create_test_state();
    let ctx = admin_ctx();

    let editor = create_role(&state, "EDITOR").await;
    create_test_user(&stores.users, "alice").await;

    let user = state
        .user_admin
        .update_roles(&ctx, "alice", vec![editor.id, Uuid::new_v4()])
        .await
        .unwrap();

    assert_eq!(user.roles.len(), 1);
    assert_eq!(user.roles[0].name, "EDITOR");
}

#[tokio::test]
async fn test_available_roles_is_all_minus_assigned() {
    let (state, stores) = create_test_state();
    let ctx = admin_ctx();

    let editor = create_role(&state, "EDITOR").await;
    create_role(&state, "AUDITOR").await;
    create_test_user(&stores.users, "alice").await;

    state
        .user_admin
        .update_roles(&ctx, "alice", vec![editor.id])
        .await
        .unwrap();

    let available = state
        .user_admin
        .find_available_roles(&ctx, "alice")
        .await
        .unwrap();

    let names: Vec<&str> = available.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["AUDITOR"]);
}

#[tokio::test]
async fn test_toggle_enabled_flips_state() {
    let (state, stores) = create_test_state();
    let ctx = admin_ctx();

    create_test_user(&stores.users, "alice").await;

    let user = state.user_admin.toggle_enabled(&ctx, "alice").await.unwrap();
    assert!(!user.user.enabled);

    let user = state.user_admin.toggle_enabled(&ctx, "alice").await.unwrap();
    assert!(user.user.enabled);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let (state, _stores) = create_test_state();

    let result = state.user_admin.find_by_username(&admin_ctx(), "ghost").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = state
        .user_admin
        .update_roles(&admin_ctx(), "ghost", vec![])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_mutations_require_admin() {
    let (state, stores) = create_test_state();
    create_test_user(&stores.users, "alice").await;

    let result = state
        .user_admin
        .toggle_enabled(&plain_ctx(), "alice")
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let result = state
        .user_admin
        .update_roles(&plain_ctx(), "alice", vec![])
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_list_users_includes_roles() {
    let (state, stores) = create_test_state();
    let ctx = admin_ctx();

    let editor = create_role(&state, "EDITOR").await;
    create_test_user(&stores.users, "alice").await;
    create_test_user(&stores.users, "bob").await;

    state
        .user_admin
        .update_roles(&ctx, "alice", vec![editor.id])
        .await
        .unwrap();

    let users = state.user_admin.list(&ctx, 50, 0).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].user.username, "alice");
    assert_eq!(users[0].roles.len(), 1);
    assert!(users[1].roles.is_empty());
}
