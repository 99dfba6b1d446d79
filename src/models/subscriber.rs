//! 订阅者模型：按技能订阅职位邮件

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscriber
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

/// Create subscriber request
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateSubscriberRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Update subscriber request（按当前用户邮箱更新自己的订阅）
#[derive(Debug, Deserialize)]
pub struct UpdateSubscriberRequest {
    pub name: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// 订阅技能响应
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SubscriberSkills {
    pub email: String,
    pub skills: Vec<String>,
}
