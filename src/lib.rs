//! 授权服务器管理核心
//! 角色/权限/客户端注册的管理协议、角色蕴含层级缓存与安全过滤器链装配

pub mod auth;
pub mod chain;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod hierarchy;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
