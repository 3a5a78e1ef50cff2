//! OAuth 客户端注册模型
//! 密钥只写不读：领域模型不实现 Serialize，响应一律走 ClientResponse

use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 客户端注册记录
///
/// `secret_hash` 为 `None` 表示两步注册协议的密钥步骤尚未成功，
/// 该客户端处于不完整状态，不能通过任何需要密钥校验的认证流程。
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Client {
    pub client_id: String,
    pub secret_hash: Option<String>,
    pub scopes: Vec<String>,
    pub grant_types: Vec<String>,
    pub redirect_uris: Vec<String>,
    pub access_token_validity_secs: i64,
    pub refresh_token_validity_secs: i64,
    pub auto_approve_scopes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// 密钥步骤是否已完成
    pub fn is_complete(&self) -> bool {
        self.secret_hash.is_some()
    }

    /// 从请求构造详情记录（不含密钥），缺省的 auto-approve 归一化为空集
    pub fn from_request(req: &CreateOrUpdateClientRequest) -> Self {
        let now = Utc::now();
        Self {
            client_id: req.client_id.clone(),
            secret_hash: None,
            scopes: normalize_set(&req.scopes),
            grant_types: normalize_set(&req.grant_types),
            redirect_uris: normalize_set(&req.redirect_uris),
            access_token_validity_secs: req.access_token_validity_secs.unwrap_or(900),
            refresh_token_validity_secs: req.refresh_token_validity_secs.unwrap_or(604_800),
            auto_approve_scopes: req
                .auto_approve_scopes
                .as_deref()
                .map(normalize_set)
                .unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 去重并排序，保证集合语义与确定的存储顺序
fn normalize_set(values: &[String]) -> Vec<String> {
    let mut v: Vec<String> = values.to_vec();
    v.sort();
    v.dedup();
    v
}

/// 创建/更新客户端请求
///
/// 密钥用 `Secret` 包装：不会出现在 Debug 输出或日志里
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrUpdateClientRequest {
    #[validate(length(min = 1, max = 128))]
    pub client_id: String,
    pub client_secret: Secret<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub grant_types: Vec<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    pub access_token_validity_secs: Option<i64>,
    pub refresh_token_validity_secs: Option<i64>,
    pub auto_approve_scopes: Option<Vec<String>>,
}

/// 仅设置/轮换密钥的请求（两步协议第二步的重试入口）
#[derive(Debug, Deserialize)]
pub struct SetClientSecretRequest {
    pub client_secret: Secret<String>,
}

/// 客户端读路径视图，永不包含密钥
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub client_id: String,
    pub scopes: Vec<String>,
    pub grant_types: Vec<String>,
    pub redirect_uris: Vec<String>,
    pub access_token_validity_secs: i64,
    pub refresh_token_validity_secs: i64,
    pub auto_approve_scopes: Vec<String>,
    /// 两步协议是否已完成（详情与密钥均落库）
    pub complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            complete: c.is_complete(),
            client_id: c.client_id,
            scopes: c.scopes,
            grant_types: c.grant_types,
            redirect_uris: c.redirect_uris,
            access_token_validity_secs: c.access_token_validity_secs,
            refresh_token_validity_secs: c.refresh_token_validity_secs,
            auto_approve_scopes: c.auto_approve_scopes,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn request(auto_approves: Option<Vec<String>>) -> CreateOrUpdateClientRequest {
        CreateOrUpdateClientRequest {
            client_id: "web-app".to_string(),
            client_secret: Secret::new("s3cret".to_string()),
            scopes: vec!["read".to_string(), "read".to_string(), "write".to_string()],
            grant_types: vec!["authorization_code".to_string()],
            redirect_uris: vec![],
            access_token_validity_secs: None,
            refresh_token_validity_secs: None,
            auto_approve_scopes: auto_approves,
        }
    }

    #[test]
    fn test_auto_approve_defaults_to_empty() {
        let client = Client::from_request(&request(None));
        assert!(client.auto_approve_scopes.is_empty());
        assert!(!client.is_complete());
    }

    #[test]
    fn test_scopes_deduplicated() {
        let client = Client::from_request(&request(Some(vec!["read".to_string()])));
        assert_eq!(client.scopes, vec!["read".to_string(), "write".to_string()]);
        assert_eq!(client.auto_approve_scopes, vec!["read".to_string()]);
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let req = request(None);
        let debugged = format!("{:?}", req);
        assert!(!debugged.contains("s3cret"));
    }
}
