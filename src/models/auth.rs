//! 认证请求/响应模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::RoleRef;

/// 令牌载荷中的用户信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Option<RoleRef>,
}

/// Login request（username 即登录邮箱）
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
///
/// 刷新令牌不进入响应体，只通过 HTTP-only cookie 下发。
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: TokenUser,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}
