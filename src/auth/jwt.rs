//! Bearer 令牌校验
//! 令牌的签发流程属于外部认证服务；这里只做管理面入口的验签，
//! `issue_token` 仅供运维工具与测试构造凭据。

use crate::{config::AppConfig, error::AppError};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 id
    pub sub: String,
    pub username: String,
    /// 持有的角色名（归一化大写）
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_exp_secs: u64,
}

impl JwtService {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret().as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_exp_secs: config.security.access_token_exp_secs,
        })
    }

    /// 构造访问令牌（运维与测试用）
    pub fn issue_token(
        &self,
        user_id: &Uuid,
        username: &str,
        roles: Vec<String>,
    ) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            roles,
            iat: now,
            exp: now + self.access_token_exp_secs as i64,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {}", e)))
    }

    /// 验签并解出声明；任何失败都归为认证失败
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use secrecy::Secret;

    fn test_service() -> JwtService {
        let config = AppConfig {
            server: ServerConfig {
                addr: "127.0.0.1:0".to_string(),
                graceful_shutdown_timeout_secs: 5,
            },
            database: DatabaseConfig {
                url: Secret::new("postgresql://localhost/uaa_test".to_string()),
                max_connections: 5,
                min_connections: 1,
                acquire_timeout_secs: 5,
                idle_timeout_secs: 300,
                max_lifetime_secs: 1800,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: Secret::new(
                    "test-secret-key-for-testing-only-min-32-chars".to_string(),
                ),
                access_token_exp_secs: 300,
                decision_log_statuses: vec![400, 401, 403, 404, 409],
            },
        };
        JwtService::from_config(&config).unwrap()
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let service = test_service();
        let user_id = Uuid::new_v4();

        let token = service
            .issue_token(&user_id, "admin", vec!["ROLE_ADMIN".to_string()])
            .unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.roles, vec!["ROLE_ADMIN".to_string()]);
    }

    #[test]
    fn test_validate_garbage_token() {
        let service = test_service();
        assert!(service.validate_access_token("not-a-token").is_err());
    }
}
