//! 权限模型：一条 (method, apiPath) 即一个原子授权单元

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub api_path: String,
    pub method: String,
    pub module: Option<String>,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

/// 请求鉴权时使用的精简权限项
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct PermissionGrant {
    pub method: String,
    pub api_path: String,
}

/// Create permission request
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub api_path: String,
    #[validate(length(min = 1))]
    pub method: String,
    pub module: Option<String>,
}

/// Update permission request
#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    pub name: Option<String>,
    pub api_path: Option<String>,
    pub method: Option<String>,
    pub module: Option<String>,
}
