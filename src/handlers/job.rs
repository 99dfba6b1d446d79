//! 职位管理的 HTTP 处理器
//! 列表与详情为公开路由，写操作需要权限

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::job::*,
    models::page::{PageQuery, Paginated},
    repository::JobRepository,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 创建职位
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let job = JobRepository::new(state.db.clone())
        .create(&req, current_user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// 分页列出职位
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (current, limit, offset) = page.normalize();
    let repo = JobRepository::new(state.db.clone());

    let total = repo.count().await?;
    let jobs = repo.list(limit, offset).await?;

    Ok(Json(Paginated::new(current, limit, total, jobs)))
}

/// 获取单个职位
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let job = JobRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(job))
}

/// 更新职位
pub async fn update_job(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = JobRepository::new(state.db.clone())
        .update(id, &req, current_user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(job))
}

/// 软删除职位
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = JobRepository::new(state.db.clone())
        .soft_delete(id, current_user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "deleted": true })))
}
