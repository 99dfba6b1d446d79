//! Resume repository (简历数据访问)

use crate::{error::AppError, models::resume::*};
use chrono::Utc;
use sqlx::{types::Json, PgPool, Row};
use uuid::Uuid;

pub struct ResumeRepository {
    db: PgPool,
}

impl ResumeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 列出简历
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Resume>, AppError> {
        let resumes = sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE NOT is_deleted ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(resumes)
    }

    /// 统计简历数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM resumes WHERE NOT is_deleted")
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }

    /// 根据 ID 查找简历
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Resume>, AppError> {
        let resume = sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(resume)
    }

    /// 查找某个用户投递的全部简历
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Resume>, AppError> {
        let resumes = sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE user_id = $1 AND NOT is_deleted ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(resumes)
    }

    /// 创建简历，初始状态 PENDING 并写入第一条历史
    pub async fn create(
        &self,
        req: &CreateResumeRequest,
        user_id: Uuid,
        email: &str,
    ) -> Result<Resume, AppError> {
        let history = Json(vec![ResumeHistoryEntry {
            status: RESUME_STATUS_PENDING.to_string(),
            updated_at: Utc::now(),
            updated_by: user_id,
        }]);

        let resume = sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (email, user_id, url, status, company_id, job_id, history, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(user_id)
        .bind(&req.url)
        .bind(RESUME_STATUS_PENDING)
        .bind(req.company_id)
        .bind(req.job_id)
        .bind(history)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(resume)
    }

    /// 流转简历状态并追加历史条目
    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
        updated_by: Uuid,
    ) -> Result<Option<Resume>, AppError> {
        let entry = Json(ResumeHistoryEntry {
            status: status.to_string(),
            updated_at: Utc::now(),
            updated_by,
        });

        let resume = sqlx::query_as::<_, Resume>(
            r#"
            UPDATE resumes
            SET
                status = $2,
                history = history || jsonb_build_array($3::jsonb),
                updated_by = $4,
                updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(entry)
        .bind(updated_by)
        .fetch_optional(&self.db)
        .await?;

        Ok(resume)
    }

    /// 软删除简历
    pub async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE resumes
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
