//! Authentication and authorization plumbing

pub mod jwt;
pub mod middleware;
pub mod secret;

pub use jwt::{Claims, JwtService};
pub use middleware::AuthContext;
pub use secret::SecretHasher;

/// 角色管理能力对应的 authority
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
/// 只读管理能力对应的 authority
pub const ROLE_ADMIN_READ: &str = "ROLE_ADMIN_READ";
