//! 权限解析服务
//!
//! 权限集在每次请求时重新解析，不做任何缓存：
//! 角色或权限的修改在该身份的下一次请求即刻生效，
//! 代价是每个请求多一次查询。

use crate::{error::AppError, models::permission::PermissionGrant, repository::RoleRepository};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PermissionService {
    db: PgPool,
}

impl PermissionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 解析角色的权限集
    ///
    /// 角色缺失、不存在或未激活时返回空集：
    /// 该身份仍是已认证状态，但只能访问公开/豁免路由。
    pub async fn resolve(&self, role_id: Option<Uuid>) -> Result<Vec<PermissionGrant>, AppError> {
        let Some(role_id) = role_id else {
            return Ok(Vec::new());
        };

        RoleRepository::new(self.db.clone())
            .resolve_grants(role_id)
            .await
    }
}
