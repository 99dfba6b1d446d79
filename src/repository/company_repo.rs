//! Company repository (公司数据访问)

use crate::{error::AppError, models::company::*};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct CompanyRepository {
    db: PgPool,
}

impl CompanyRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 列出公司
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE NOT is_deleted ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(companies)
    }

    /// 统计公司数量
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM companies WHERE NOT is_deleted")
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }

    /// 根据 ID 查找公司
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(company)
    }

    /// 创建公司
    pub async fn create(
        &self,
        req: &CreateCompanyRequest,
        created_by: Uuid,
    ) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, address, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.description)
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(company)
    }

    /// 更新公司
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateCompanyRequest,
        updated_by: Uuid,
    ) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                description = COALESCE($4, description),
                updated_by = $5,
                updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.description)
        .bind(updated_by)
        .fetch_optional(&self.db)
        .await?;

        Ok(company)
    }

    /// 软删除公司
    pub async fn soft_delete(&self, id: Uuid, deleted_by: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE companies
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
