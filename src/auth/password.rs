//! 密码哈希与验证（Argon2id）

use crate::{config::AppConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 使用 OWASP 推荐参数创建
    pub fn new() -> Self {
        // m=64MiB, t=3 iterations, p=4 lanes
        let params = Params::new(65536, 3, 4, None).expect("Invalid Argon2 params");

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2 }
    }

    /// 哈希密码
    ///
    /// 计算量大，异步上下文中调用方需通过 spawn_blocking 隔离。
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// 验证密码
    ///
    /// 不匹配与哈希不可解析统一返回 InvalidCredentials，
    /// 调用方无法区分具体原因。
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::debug!("Failed to parse password hash: {:?}", e);
            AppError::InvalidCredentials
        })?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::InvalidCredentials)
    }

    /// 校验密码策略
    pub fn validate_password_policy(password: &str, config: &AppConfig) -> Result<(), AppError> {
        if password.len() < config.security.password_min_length {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                config.security.password_min_length
            )));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "TestPassword123!";

        let hash = hasher.hash(password).unwrap();
        hasher.verify(password, &hash).unwrap();
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = PasswordHasher::new();
        let password = "TestPassword123!";

        let hash = hasher.hash(password).unwrap();
        assert!(matches!(
            hasher.verify("WrongPassword", &hash),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_fails_with_garbage_hash() {
        let hasher = PasswordHasher::new();
        assert!(matches!(
            hasher.verify("TestPassword123!", "not-a-phc-string"),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = PasswordHasher::new();
        let password = "TestPassword123!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // salt 不同，哈希必然不同
        assert_ne!(hash1, hash2);

        hasher.verify(password, &hash1).unwrap();
        hasher.verify(password, &hash2).unwrap();
    }
}
