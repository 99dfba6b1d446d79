//! User repository (用户数据访问层)
//!
//! 用户从不物理删除，所有查询都过滤软删除标记。

use crate::{error::AppError, models::user::*, seed::ADMIN_EMAIL};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 根据登录邮箱查找用户
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND NOT is_deleted",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 根据 ID 查找用户
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 根据存储的刷新令牌查找用户
    ///
    /// 精确匹配槽中的当前值：被轮换覆盖的旧令牌自然查不到，
    /// 这就是对重放的防御。
    pub async fn find_by_refresh_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE refresh_token = $1 AND NOT is_deleted",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 检查邮箱是否已被占用
    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let count: i64 =
            sqlx::query("SELECT COUNT(*) FROM users WHERE email = $1 AND NOT is_deleted")
                .bind(email)
                .fetch_one(&self.db)
                .await?
                .get(0);

        Ok(count > 0)
    }

    /// 创建用户
    pub async fn create(
        &self,
        req: &CreateUserRequest,
        password_hash: &str,
        created_by: Option<Uuid>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, age, gender, address, company_id, role_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(password_hash)
        .bind(req.age)
        .bind(&req.gender)
        .bind(&req.address)
        .bind(req.company_id)
        .bind(req.role_id)
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// 更新用户
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateUserRequest,
        updated_by: Uuid,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender),
                address = COALESCE($5, address),
                company_id = COALESCE($6, company_id),
                role_id = COALESCE($7, role_id),
                updated_by = $8,
                updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(req.age)
        .bind(&req.gender)
        .bind(&req.address)
        .bind(req.company_id)
        .bind(req.role_id)
        .bind(updated_by)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 覆盖刷新令牌槽
    ///
    /// 单条 UPDATE 即原子替换：新值写入的同时旧值作废。
    /// 空字符串表示登出后的无效槽。
    pub async fn update_refresh_token(&self, id: Uuid, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .bind(token)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 软删除用户
    ///
    /// 种子管理员账号受保护，拒绝删除。
    pub async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> Result<bool, AppError> {
        let user = self.find_by_id(&id).await?.ok_or(AppError::NotFound)?;

        if user.email == ADMIN_EMAIL {
            return Err(AppError::ProtectedEntity(format!(
                "Cannot delete the {} account",
                ADMIN_EMAIL
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_deleted = TRUE, deleted_at = NOW(), deleted_by = $2, refresh_token = NULL
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(deleted_by)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 列出用户
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE NOT is_deleted ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// 统计用户数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM users WHERE NOT is_deleted")
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }
}
