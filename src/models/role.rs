//! 角色与角色请求模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::Permission;

/// Role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

/// 令牌与鉴权上下文中使用的角色引用
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRef {
    pub id: Uuid,
    pub name: String,
}

/// 角色详情（含权限列表）
#[derive(Debug, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Create role request
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// 权限 ID 列表
    #[serde(default)]
    pub permissions: Vec<Uuid>,
}

/// Update role request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub description: Option<String>,
    pub is_active: Option<bool>,
    /// 为 Some 时整体替换角色的权限列表
    pub permissions: Option<Vec<Uuid>>,
}

fn default_true() -> bool {
    true
}
