//! 职位模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job posting
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub name: String,
    pub skills: Vec<String>,
    pub company_id: Option<Uuid>,
    pub location: Option<String>,
    pub salary: Option<i64>,
    pub quantity: Option<i32>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

/// Create job request
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub company_id: Option<Uuid>,
    pub location: Option<String>,
    pub salary: Option<i64>,
    pub quantity: Option<i32>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Update job request
#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub company_id: Option<Uuid>,
    pub location: Option<String>,
    pub salary: Option<i64>,
    pub quantity: Option<i32>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}
