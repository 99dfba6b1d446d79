//! 简历（求职申请）模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// 简历状态流转：PENDING → REVIEWING → APPROVED / REJECTED
pub const RESUME_STATUS_PENDING: &str = "PENDING";

/// 状态历史条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeHistoryEntry {
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Uuid,
}

/// Resume
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub email: String,
    pub user_id: Uuid,
    pub url: String,
    pub status: String,
    pub company_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub history: Json<Vec<ResumeHistoryEntry>>,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

/// Create resume request（email/user 取自当前用户）
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateResumeRequest {
    #[validate(length(min = 1))]
    pub url: String,
    pub company_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
}

/// Update resume request（只允许流转状态）
#[derive(Debug, Deserialize, validator::Validate)]
pub struct UpdateResumeRequest {
    #[validate(length(min = 1))]
    pub status: String,
}
