//! 订阅者管理的 HTTP 处理器
//!
//! 查询/更新自己的订阅跳过权限检查：任何已认证用户都可操作，
//! 归属通过当前用户邮箱限定。

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::page::{PageQuery, Paginated},
    models::subscriber::*,
    repository::SubscriberRepository,
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

/// 创建订阅者
pub async fn create_subscriber(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<CreateSubscriberRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let subscriber = SubscriberRepository::new(state.db.clone())
        .create(&req, current_user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(subscriber)))
}

/// 查询当前用户订阅的技能
pub async fn get_skills(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let skills = SubscriberRepository::new(state.db.clone())
        .skills_by_email(&current_user.email)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(skills))
}

/// 分页列出订阅者
pub async fn list_subscribers(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (current, limit, offset) = page.normalize();
    let repo = SubscriberRepository::new(state.db.clone());

    let total = repo.count().await?;
    let subscribers = repo.list(limit, offset).await?;

    Ok(Json(Paginated::new(current, limit, total, subscribers)))
}

/// 获取单个订阅者
pub async fn get_subscriber(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let subscriber = SubscriberRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(subscriber))
}

/// 更新当前用户自己的订阅
pub async fn update_subscriber(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<UpdateSubscriberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let subscriber = SubscriberRepository::new(state.db.clone())
        .update_by_email(&current_user.email, &req, current_user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(subscriber))
}

/// 软删除订阅者
pub async fn delete_subscriber(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = SubscriberRepository::new(state.db.clone())
        .soft_delete(id, current_user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "deleted": true })))
}
