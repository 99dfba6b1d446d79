//! Job repository (职位数据访问)

use crate::{error::AppError, models::job::*};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct JobRepository {
    db: PgPool,
}

impl JobRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 列出职位
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Job>, AppError> {
        let jobs = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE NOT is_deleted ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(jobs)
    }

    /// 统计职位数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM jobs WHERE NOT is_deleted")
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }

    /// 根据 ID 查找职位
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(job)
    }

    /// 创建职位
    pub async fn create(&self, req: &CreateJobRequest, created_by: Uuid) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                name, skills, company_id, location, salary, quantity, level,
                description, start_date, end_date, is_active, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.skills)
        .bind(req.company_id)
        .bind(&req.location)
        .bind(req.salary)
        .bind(req.quantity)
        .bind(&req.level)
        .bind(&req.description)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.is_active)
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(job)
    }

    /// 更新职位
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateJobRequest,
        updated_by: Uuid,
    ) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET
                name = COALESCE($2, name),
                skills = COALESCE($3, skills),
                company_id = COALESCE($4, company_id),
                location = COALESCE($5, location),
                salary = COALESCE($6, salary),
                quantity = COALESCE($7, quantity),
                level = COALESCE($8, level),
                description = COALESCE($9, description),
                start_date = COALESCE($10, start_date),
                end_date = COALESCE($11, end_date),
                is_active = COALESCE($12, is_active),
                updated_by = $13,
                updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.skills)
        .bind(req.company_id)
        .bind(&req.location)
        .bind(req.salary)
        .bind(req.quantity)
        .bind(&req.level)
        .bind(&req.description)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.is_active)
        .bind(updated_by)
        .fetch_optional(&self.db)
        .await?;

        Ok(job)
    }

    /// 软删除职位
    pub async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
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
