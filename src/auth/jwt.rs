//! JWT 令牌签发与验证
//! 访问令牌与刷新令牌使用独立密钥，互相无法通过验证

use crate::{config::AppConfig, error::AppError, models::auth::TokenUser, models::role::RoleRef};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 刷新令牌的 subject 标记
pub const REFRESH_TOKEN_SUBJECT: &str = "refresh_token";
/// 刷新令牌的 issuer 标记
pub const REFRESH_TOKEN_ISSUER: &str = "from server";

/// JWT claims
///
/// 访问令牌：`sub` 为用户 ID，`iss` 缺省。
/// 刷新令牌：`sub` = "refresh_token"，`iss` = "from server"，
/// 与独立密钥共同保证两种令牌不可互换。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject（用户 ID 或刷新令牌标记）
    pub sub: String,

    /// Issuer（仅刷新令牌携带）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// 用户 ID
    pub id: Uuid,

    /// 用户姓名
    pub name: String,

    /// 登录邮箱
    pub email: String,

    /// 角色引用（id + 名称）；权限集在每次请求时单独解析，不进入令牌
    pub role: Option<RoleRef>,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID（唯一令牌标识；同秒签发的两个令牌也互不相同）
    pub jti: String,
}

impl Claims {
    /// 取出令牌携带的用户信息
    pub fn token_user(&self) -> TokenUser {
        TokenUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// 令牌对响应
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 访问令牌剩余有效期（秒）
    pub expires_in: u64,
}

/// JWT service
pub struct JwtService {
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
    access_token_exp_secs: u64,
    refresh_token_exp_secs: u64,
}

impl JwtService {
    /// 从独立密钥创建服务
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_token_exp_secs: u64,
        refresh_token_exp_secs: u64,
    ) -> Result<Self, AppError> {
        // HS256 密钥至少 32 字节
        if access_secret.len() < 32 || refresh_secret.len() < 32 {
            return Err(AppError::Config(
                "JWT secret too short (min 32 chars)".to_string(),
            ));
        }

        Ok(Self {
            access_encoding_key: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding_key: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_token_exp_secs,
            refresh_token_exp_secs,
        })
    }

    /// 从配置创建服务
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.access_token_secret.expose_secret(),
            config.security.refresh_token_secret.expose_secret(),
            config.security.access_token_exp_secs,
            config.security.refresh_token_exp_secs,
        )
    }

    /// 刷新令牌有效期（秒），用于设置 cookie 的 max-age
    pub fn refresh_token_exp_secs(&self) -> u64 {
        self.refresh_token_exp_secs
    }

    /// 签发访问令牌
    pub fn issue_access_token(&self, user: &TokenUser) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.access_token_exp_secs as i64);

        let claims = Claims {
            sub: user.id.to_string(),
            iss: None,
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.access_encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// 签发刷新令牌
    pub fn issue_refresh_token(&self, user: &TokenUser) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.refresh_token_exp_secs as i64);

        let claims = Claims {
            sub: REFRESH_TOKEN_SUBJECT.to_string(),
            iss: Some(REFRESH_TOKEN_ISSUER.to_string()),
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.refresh_encoding_key).map_err(|e| {
            tracing::error!("Failed to encode refresh token: {:?}", e);
            AppError::Internal(format!("Failed to encode refresh token: {}", e))
        })
    }

    /// 签发令牌对
    pub fn issue_token_pair(&self, user: &TokenUser) -> Result<TokenPair, AppError> {
        let access_token = self.issue_access_token(user)?;
        let refresh_token = self.issue_refresh_token(user)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_token_exp_secs,
        })
    }

    /// 解码并验证签名与有效期
    fn decode_with(&self, token: &str, key: &DecodingKey) -> Result<Claims, AppError> {
        decode::<Claims>(token, key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => {
                    tracing::debug!("Token validation failed: {:?}", e);
                    AppError::TokenMalformed
                }
            })
    }

    /// 验证访问令牌
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_with(token, &self.access_decoding_key)?;

        if claims.sub == REFRESH_TOKEN_SUBJECT {
            tracing::debug!("Refresh token presented as access token");
            return Err(AppError::TokenMalformed);
        }

        Ok(claims)
    }

    /// 验证刷新令牌
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_with(token, &self.refresh_decoding_key)?;

        if claims.sub != REFRESH_TOKEN_SUBJECT
            || claims.iss.as_deref() != Some(REFRESH_TOKEN_ISSUER)
        {
            tracing::debug!("Token missing refresh markers: sub='{}'", claims.sub);
            return Err(AppError::TokenMalformed);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "test-access-secret-key-32-characters!";
    const REFRESH_SECRET: &str = "test-refresh-secret-key-32-characters";

    fn test_service() -> JwtService {
        JwtService::new(ACCESS_SECRET, REFRESH_SECRET, 900, 604800).unwrap()
    }

    fn test_user() -> TokenUser {
        TokenUser {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            role: Some(RoleRef {
                id: Uuid::new_v4(),
                name: "NORMAL_USER".to_string(),
            }),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_service();
        let user = test_user();

        let token = service.issue_access_token(&user).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role.as_ref().unwrap().name, "NORMAL_USER");
        assert!(claims.iss.is_none());
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = test_service();
        let user = test_user();

        let token = service.issue_refresh_token(&user).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, REFRESH_TOKEN_SUBJECT);
        assert_eq!(claims.iss.as_deref(), Some(REFRESH_TOKEN_ISSUER));
        assert_eq!(claims.id, user.id);
    }

    #[test]
    fn test_successive_tokens_are_unique() {
        // 同一秒内连续签发的令牌也必须不同，否则轮换失去意义
        let service = test_service();
        let user = test_user();

        let first = service.issue_refresh_token(&user).unwrap();
        let second = service.issue_refresh_token(&user).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_token_kinds_cannot_be_cross_validated() {
        let service = test_service();
        let user = test_user();

        let access_token = service.issue_access_token(&user).unwrap();
        let refresh_token = service.issue_refresh_token(&user).unwrap();

        assert!(service.validate_refresh_token(&access_token).is_err());
        assert!(service.validate_access_token(&refresh_token).is_err());
    }

    #[test]
    fn test_marker_check_even_with_refresh_secret() {
        // 用刷新密钥签名但缺少标记的令牌同样被拒绝
        let service = test_service();
        let user = test_user();
        let now = Utc::now();

        let claims = Claims {
            sub: user.id.to_string(),
            iss: None,
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: None,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(REFRESH_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_refresh_token(&token),
            Err(AppError::TokenMalformed)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = test_service();
        let user = test_user();
        let now = Utc::now();

        // 过期超过默认 60 秒 leeway
        let claims = Claims {
            sub: user.id.to_string(),
            iss: None,
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: None,
            iat: (now - Duration::seconds(1000)).timestamp(),
            exp: (now - Duration::seconds(120)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = test_service();
        assert!(matches!(
            service.validate_access_token("not-a-jwt"),
            Err(AppError::TokenMalformed)
        ));
        assert!(matches!(
            service.validate_refresh_token(""),
            Err(AppError::TokenMalformed)
        ));
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(JwtService::new("short", REFRESH_SECRET, 900, 3600).is_err());
        assert!(JwtService::new(ACCESS_SECRET, "short", 900, 3600).is_err());
    }
}
