//! Role repository (角色数据访问)

use crate::{
    error::AppError,
    models::permission::{Permission, PermissionGrant},
    models::role::*,
    seed::ADMIN_ROLE,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct RoleRepository {
    db: PgPool,
}

impl RoleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 列出角色
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE NOT is_deleted ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(roles)
    }

    /// 统计角色数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM roles WHERE NOT is_deleted")
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }

    /// 根据名称查找角色
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE name = $1 AND NOT is_deleted",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(role)
    }

    /// 根据 ID 查找角色
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(role)
    }

    /// 查找角色引用（id + 名称）
    pub async fn find_ref(&self, id: &Uuid) -> Result<Option<RoleRef>, AppError> {
        Ok(self
            .find_by_id(id)
            .await?
            .map(|r| RoleRef { id: r.id, name: r.name }))
    }

    /// 创建角色并绑定权限
    pub async fn create(
        &self,
        req: &CreateRoleRequest,
        created_by: Uuid,
    ) -> Result<Role, AppError> {
        let mut tx = self.db.begin().await?;

        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description, is_active, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.is_active)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        if !req.permissions.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT $1, unnest($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(role.id)
            .bind(&req.permissions)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(role)
    }

    /// 更新角色；permissions 为 Some 时整体替换绑定
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateRoleRequest,
        updated_by: Uuid,
    ) -> Result<Option<Role>, AppError> {
        let mut tx = self.db.begin().await?;

        let role = sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET
                description = COALESCE($2, description),
                is_active = COALESCE($3, is_active),
                updated_by = $4,
                updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.description)
        .bind(req.is_active)
        .bind(updated_by)
        .fetch_optional(&mut *tx)
        .await?;

        if role.is_some() {
            if let Some(permission_ids) = &req.permissions {
                sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                if !permission_ids.is_empty() {
                    sqlx::query(
                        r#"
                        INSERT INTO role_permissions (role_id, permission_id)
                        SELECT $1, unnest($2::uuid[])
                        ON CONFLICT DO NOTHING
                        "#,
                    )
                    .bind(id)
                    .bind(permission_ids)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;

        Ok(role)
    }

    /// 软删除角色
    ///
    /// 管理员角色受保护，拒绝删除。
    pub async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> Result<bool, AppError> {
        let role = self.find_by_id(&id).await?.ok_or(AppError::NotFound)?;

        if role.name == ADMIN_ROLE {
            return Err(AppError::ProtectedEntity(
                "Cannot delete the administrator role".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE roles
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

    /// 获取角色的完整权限列表
    pub async fn get_role_permissions(&self, role_id: Uuid) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.*
            FROM permissions p
            JOIN role_permissions rp ON p.id = rp.permission_id
            WHERE rp.role_id = $1 AND NOT p.is_deleted
            ORDER BY p.module, p.api_path, p.method
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }

    /// 获取角色的授权项（method + apiPath）
    ///
    /// 单条查询同时过滤未激活/已删除的角色与权限：
    /// 角色不存在或未激活时自然得到空集。
    pub async fn resolve_grants(&self, role_id: Uuid) -> Result<Vec<PermissionGrant>, AppError> {
        let grants = sqlx::query_as::<_, PermissionGrant>(
            r#"
            SELECT p.method, p.api_path
            FROM permissions p
            JOIN role_permissions rp ON p.id = rp.permission_id
            JOIN roles r ON r.id = rp.role_id
            WHERE r.id = $1 AND r.is_active AND NOT r.is_deleted AND NOT p.is_deleted
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(grants)
    }
}
