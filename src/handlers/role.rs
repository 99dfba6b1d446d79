//! 角色管理的 HTTP 处理器

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::page::{PageQuery, Paginated},
    models::role::*,
    repository::RoleRepository,
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

/// 创建角色
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let repo = RoleRepository::new(state.db.clone());

    if repo.find_by_name(&req.name).await?.is_some() {
        return Err(AppError::BadRequest(format!(
            "Role {} already exists",
            req.name
        )));
    }

    let role = repo.create(&req, current_user.id).await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// 分页列出角色
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (current, limit, offset) = page.normalize();
    let repo = RoleRepository::new(state.db.clone());

    let total = repo.count().await?;
    let roles = repo.list(limit, offset).await?;

    Ok(Json(Paginated::new(current, limit, total, roles)))
}

/// 获取单个角色（含权限列表）
pub async fn get_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let repo = RoleRepository::new(state.db.clone());

    let role = repo.find_by_id(&id).await?.ok_or(AppError::NotFound)?;
    let permissions = repo.get_role_permissions(role.id).await?;

    Ok(Json(RoleWithPermissions { role, permissions }))
}

/// 更新角色
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = RoleRepository::new(state.db.clone())
        .update(id, &req, current_user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(role))
}

/// 软删除角色（管理员角色受保护）
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = RoleRepository::new(state.db.clone())
        .soft_delete(id, current_user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "deleted": true })))
}
