//! 数据模型模块
//! 角色/权限、OAuth 客户端与用户的领域模型及请求/响应 DTO

pub mod client;
pub mod role;
pub mod user;
