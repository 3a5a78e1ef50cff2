//! 日志与指标初始化

use crate::config::AppConfig;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅器
///
/// RUST_LOG 环境变量优先于配置中的日志级别。
pub fn init_telemetry(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .pretty()
                .init();
        }
    }
}

/// 登记核心指标的描述
pub fn init_metrics() {
    metrics::describe_counter!("http_requests_total", "HTTP 请求总数");
    metrics::describe_histogram!("http_request_duration_seconds", "HTTP 请求耗时（秒）");
    metrics::describe_counter!("decision_log_entries_total", "决策日志命中条数");
    metrics::describe_gauge!("role_hierarchy.version", "角色层级缓存版本");
    metrics::describe_gauge!("db.pool.size", "数据库连接池大小");
    metrics::describe_gauge!("db.pool.idle", "数据库空闲连接数");
}
