//! 用户管理的 HTTP 处理器

use crate::{
    auth::middleware::CurrentUser,
    auth::password::PasswordHasher,
    error::AppError,
    middleware::AppState,
    models::page::{PageQuery, Paginated},
    models::user::*,
    repository::UserRepository,
    services::auth_service::hash_password,
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

/// 创建用户（管理端）
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    PasswordHasher::validate_password_policy(&req.password, &state.config)?;

    let repo = UserRepository::new(state.db.clone());

    if repo.email_exists(&req.email).await? {
        return Err(AppError::BadRequest(format!(
            "Email {} is already registered",
            req.email
        )));
    }

    let password_hash = hash_password(req.password.clone()).await?;
    let user = repo.create(&req, &password_hash, Some(current_user.id)).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// 分页列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (current, limit, offset) = page.normalize();
    let repo = UserRepository::new(state.db.clone());

    let total = repo.count().await?;
    let users: Vec<UserResponse> = repo
        .list(limit, offset)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(Paginated::new(current, limit, total, users)))
}

/// 获取单个用户
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(UserResponse::from(user)))
}

/// 更新用户
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::new(state.db.clone())
        .update(id, &req, current_user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(UserResponse::from(user)))
}

/// 软删除用户（种子管理员账号受保护）
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = UserRepository::new(state.db.clone())
        .soft_delete(id, current_user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "deleted": true })))
}
