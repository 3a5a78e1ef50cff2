//! 客户端密钥哈希
//! 明文只在哈希调用期间存在，存储与比对都走 argon2 哈希

use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

#[derive(Default)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl SecretHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, secret: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("secret hashing failed: {}", e)))
    }

    /// 比对候选密钥与存储的哈希；哈希格式损坏视为内部错误
    pub fn verify(&self, candidate: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("stored secret hash invalid: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = SecretHasher::new();
        let hash = hasher.hash("top-secret").unwrap();

        assert_ne!(hash, "top-secret");
        assert!(hasher.verify("top-secret", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = SecretHasher::new();
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }
}
