//! 用户（身份）模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
///
/// `refresh_token` 是该身份唯一的刷新令牌槽：
/// 每次登录/刷新/登出都会整体覆盖，同一时刻最多一个有效值。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub company_id: Option<Uuid>,
    pub role_id: Option<Uuid>,

    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

/// Create user request（管理员创建，可指定角色与公司）
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub company_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
}

/// Register request（自助注册，角色固定为普通用户）
#[derive(Debug, Deserialize, validator::Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

/// Update user request
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub company_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
}

/// User response（不含密码哈希与刷新令牌）
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub company_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            gender: user.gender,
            address: user.address,
            company_id: user.company_id,
            role_id: user.role_id,
            created_at: user.created_at,
        }
    }
}
