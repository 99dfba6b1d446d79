//! Permission repository (权限数据访问)

use crate::{error::AppError, models::permission::*};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PermissionRepository {
    db: PgPool,
}

impl PermissionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 列出权限
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT * FROM permissions
            WHERE NOT is_deleted
            ORDER BY module, api_path, method
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }

    /// 统计权限数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM permissions WHERE NOT is_deleted")
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }

    /// 根据 ID 查找权限
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Permission>, AppError> {
        let permission = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(permission)
    }

    /// 根据 (method, apiPath) 查找权限，用于唯一性检查
    pub async fn find_by_method_and_path(
        &self,
        method: &str,
        api_path: &str,
    ) -> Result<Option<Permission>, AppError> {
        let permission = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE method = $1 AND api_path = $2 AND NOT is_deleted",
        )
        .bind(method)
        .bind(api_path)
        .fetch_optional(&self.db)
        .await?;

        Ok(permission)
    }

    /// 创建权限
    pub async fn create(
        &self,
        req: &CreatePermissionRequest,
        created_by: Uuid,
    ) -> Result<Permission, AppError> {
        let permission = sqlx::query_as::<_, Permission>(
            r#"
            INSERT INTO permissions (name, api_path, method, module, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.api_path)
        .bind(req.method.to_uppercase())
        .bind(&req.module)
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(permission)
    }

    /// 更新权限
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdatePermissionRequest,
        updated_by: Uuid,
    ) -> Result<Option<Permission>, AppError> {
        let permission = sqlx::query_as::<_, Permission>(
            r#"
            UPDATE permissions
            SET
                name = COALESCE($2, name),
                api_path = COALESCE($3, api_path),
                method = COALESCE($4, method),
                module = COALESCE($5, module),
                updated_by = $6,
                updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.api_path)
        .bind(req.method.as_ref().map(|m| m.to_uppercase()))
        .bind(&req.module)
        .bind(updated_by)
        .fetch_optional(&self.db)
        .await?;

        Ok(permission)
    }

    /// 软删除权限
    pub async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET is_deleted = TRUE, deleted_at = NOW(), deleted_by = $2
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(deleted_by)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
