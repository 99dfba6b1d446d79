//! 认证服务：登录、注册、令牌刷新、登出
//!
//! 每个身份只有一个刷新令牌槽。登录与刷新无条件覆盖槽中旧值，
//! 并发刷新按"最后写入者获胜"处理：持有被覆盖令牌的客户端
//! 下次刷新会失败并需要重新登录。

use crate::{
    auth::jwt::JwtService,
    auth::password::PasswordHasher,
    config::AppConfig,
    error::AppError,
    models::auth::*,
    models::user::{CreateUserRequest, RegisterRequest},
    repository::{RoleRepository, UserRepository},
    seed::USER_ROLE,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    db: PgPool,
    jwt_service: Arc<JwtService>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_service: Arc<JwtService>, config: Arc<AppConfig>) -> Self {
        Self {
            db,
            jwt_service,
            config,
        }
    }

    /// 校验登录凭证
    ///
    /// 返回携带角色引用的用户；账号不存在与密码错误
    /// 对调用方统一表现为 None。只读，无副作用。
    pub async fn validate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<TokenUser>, AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        let Some(user) = user_repo.find_by_email(username).await? else {
            return Ok(None);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Ok(None);
        }

        let role = match user.role_id {
            Some(role_id) => RoleRepository::new(self.db.clone()).find_ref(&role_id).await?,
            None => None,
        };

        Ok(Some(TokenUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
        }))
    }

    /// 登录：签发令牌对并覆盖刷新令牌槽
    ///
    /// 返回响应体与刷新令牌，后者由 handler 写入 HTTP-only cookie。
    pub async fn login(&self, user: TokenUser) -> Result<(LoginResponse, String), AppError> {
        let pair = self.jwt_service.issue_token_pair(&user)?;

        // 无条件覆盖：这一步本身就是轮换/单会话不变量
        UserRepository::new(self.db.clone())
            .update_refresh_token(user.id, &pair.refresh_token)
            .await?;

        tracing::info!(user_id = %user.id, "Token pair issued");

        Ok((
            LoginResponse {
                access_token: pair.access_token,
                user,
            },
            pair.refresh_token,
        ))
    }

    /// 刷新：验证旧刷新令牌，重新走登录流程（轮换）
    ///
    /// 任何一步失败都统一返回 RefreshRejected，
    /// 不向调用方暴露失败的具体原因。
    pub async fn refresh(&self, presented: &str) -> Result<(LoginResponse, String), AppError> {
        self.jwt_service
            .validate_refresh_token(presented)
            .map_err(|e| {
                tracing::debug!("Refresh token validation failed: {}", e);
                AppError::RefreshRejected
            })?;

        // 只接受槽中当前值：被轮换覆盖的令牌在这里查不到
        let user = UserRepository::new(self.db.clone())
            .find_by_refresh_token(presented)
            .await
            .map_err(|_| AppError::RefreshRejected)?
            .ok_or(AppError::RefreshRejected)?;

        // 角色引用重新读取，保证后续权限解析使用最新状态
        let role = match user.role_id {
            Some(role_id) => RoleRepository::new(self.db.clone())
                .find_ref(&role_id)
                .await
                .map_err(|_| AppError::RefreshRejected)?,
            None => None,
        };

        self.login(TokenUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
        })
        .await
    }

    /// 登出：清空刷新令牌槽
    ///
    /// 即使 cookie 在客户端被窃取，槽被清空后刷新请求也会失败。
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        UserRepository::new(self.db.clone())
            .update_refresh_token(user_id, "")
            .await?;

        tracing::info!(user_id = %user_id, "User logged out");

        Ok(())
    }

    /// 自助注册，角色固定为普通用户
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError> {
        PasswordHasher::validate_password_policy(&req.password, &self.config)?;

        let user_repo = UserRepository::new(self.db.clone());

        if user_repo.email_exists(&req.email).await? {
            return Err(AppError::BadRequest(format!(
                "Email {} is already registered",
                req.email
            )));
        }

        let user_role = RoleRepository::new(self.db.clone())
            .find_by_name(USER_ROLE)
            .await?;

        let password_hash = hash_password(req.password.clone()).await?;

        let create = CreateUserRequest {
            name: req.name,
            email: req.email,
            password: String::new(),
            age: req.age,
            gender: req.gender,
            address: req.address,
            company_id: None,
            role_id: user_role.map(|r| r.id),
        };

        let user = user_repo.create(&create, &password_hash, None).await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(RegisterResponse {
            id: user.id,
            created_at: user.created_at,
        })
    }
}

/// 在阻塞线程池中哈希密码，避免拖慢异步执行器
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || PasswordHasher::new().hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// 在阻塞线程池中验证密码
async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || PasswordHasher::new().verify(&password, &hash).is_ok())
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
}
