//! 简历管理的 HTTP 处理器

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::page::{PageQuery, Paginated},
    models::resume::*,
    repository::ResumeRepository,
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

/// 投递简历（email/user 取自当前用户）
pub async fn create_resume(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<CreateResumeRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let resume = ResumeRepository::new(state.db.clone())
        .create(&req, current_user.id, &current_user.email)
        .await?;

    Ok((StatusCode::CREATED, Json(resume)))
}

/// 分页列出简历
pub async fn list_resumes(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (current, limit, offset) = page.normalize();
    let repo = ResumeRepository::new(state.db.clone());

    let total = repo.count().await?;
    let resumes = repo.list(limit, offset).await?;

    Ok(Json(Paginated::new(current, limit, total, resumes)))
}

/// 获取单份简历
pub async fn get_resume(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resume = ResumeRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(resume))
}

/// 查询当前用户投递的简历
pub async fn get_resumes_by_user(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let resumes = ResumeRepository::new(state.db.clone())
        .find_by_user(current_user.id)
        .await?;

    Ok(Json(resumes))
}

/// 流转简历状态
pub async fn update_resume(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let resume = ResumeRepository::new(state.db.clone())
        .update_status(id, &req.status, current_user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(resume))
}

/// 软删除简历
pub async fn delete_resume(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = ResumeRepository::new(state.db.clone())
        .soft_delete(id, current_user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "deleted": true })))
}
