//! Business logic services layer

pub mod client_admin;
pub mod role_admin;
pub mod user_admin;

pub use client_admin::ClientAdminService;
pub use role_admin::RoleAdminService;
pub use user_admin::UserAdminService;

use crate::{auth::AuthContext, error::AppError, hierarchy::RoleHierarchy};

/// 能力检查：调用方持有的任一角色蕴含所需 authority 之一即可
///
/// 每个变更操作都显式调用它，而不是依赖外层拦截。
pub(crate) fn require_any_authority(
    hierarchy: &RoleHierarchy,
    ctx: &AuthContext,
    authorities: &[&str],
) -> Result<(), AppError> {
    let allowed = ctx
        .roles
        .iter()
        .any(|role| authorities.iter().any(|authority| hierarchy.implies(role, authority)));

    if !allowed {
        tracing::warn!(
            user = %ctx.username,
            required = ?authorities,
            "Permission denied"
        );
        return Err(AppError::Forbidden);
    }

    Ok(())
}
