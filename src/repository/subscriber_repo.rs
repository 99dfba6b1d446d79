//! Subscriber repository (订阅者数据访问)

use crate::{error::AppError, models::subscriber::*};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct SubscriberRepository {
    db: PgPool,
}

impl SubscriberRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 列出订阅者
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Subscriber>, AppError> {
        let subscribers = sqlx::query_as::<_, Subscriber>(
            "SELECT * FROM subscribers WHERE NOT is_deleted ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(subscribers)
    }

    /// 统计订阅者数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM subscribers WHERE NOT is_deleted")
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }

    /// 根据 ID 查找订阅者
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Subscriber>, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            "SELECT * FROM subscribers WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(subscriber)
    }

    /// 查询某邮箱订阅的技能
    pub async fn skills_by_email(&self, email: &str) -> Result<Option<SubscriberSkills>, AppError> {
        let skills = sqlx::query_as::<_, SubscriberSkills>(
            "SELECT email, skills FROM subscribers WHERE email = $1 AND NOT is_deleted",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(skills)
    }

    /// 创建订阅者
    pub async fn create(
        &self,
        req: &CreateSubscriberRequest,
        created_by: Uuid,
    ) -> Result<Subscriber, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO subscribers (name, email, skills, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.skills)
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(subscriber)
    }

    /// 按邮箱更新订阅（用户只能更新自己的订阅）
    pub async fn update_by_email(
        &self,
        email: &str,
        req: &UpdateSubscriberRequest,
        updated_by: Uuid,
    ) -> Result<Option<Subscriber>, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            r#"
            UPDATE subscribers
            SET
                name = COALESCE($2, name),
                skills = COALESCE($3, skills),
                updated_by = $4,
                updated_at = NOW()
            WHERE email = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(&req.name)
        .bind(&req.skills)
        .bind(updated_by)
        .fetch_optional(&self.db)
        .await?;

        Ok(subscriber)
    }

    /// 软删除订阅者
    pub async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE subscribers
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
