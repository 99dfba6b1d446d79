//! 权限管理的 HTTP 处理器
//!
//! (method, apiPath) 全局唯一，创建与更新时都会检查。

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::page::{PageQuery, Paginated},
    models::permission::*,
    repository::PermissionRepository,
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

/// 创建权限
pub async fn create_permission(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<CreatePermissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let repo = PermissionRepository::new(state.db.clone());

    let method = req.method.to_uppercase();
    if repo
        .find_by_method_and_path(&method, &req.api_path)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(format!(
            "Permission with apiPath={}, method={} already exists",
            req.api_path, method
        )));
    }

    let permission = repo.create(&req, current_user.id).await?;

    Ok((StatusCode::CREATED, Json(permission)))
}

/// 分页列出权限
pub async fn list_permissions(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (current, limit, offset) = page.normalize();
    let repo = PermissionRepository::new(state.db.clone());

    let total = repo.count().await?;
    let permissions = repo.list(limit, offset).await?;

    Ok(Json(Paginated::new(current, limit, total, permissions)))
}

/// 获取单个权限
pub async fn get_permission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permission = PermissionRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(permission))
}

/// 更新权限
pub async fn update_permission(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePermissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let repo = PermissionRepository::new(state.db.clone());

    // 变更 (method, apiPath) 时防止与其他权限撞车
    if req.method.is_some() || req.api_path.is_some() {
        let existing = repo.find_by_id(&id).await?.ok_or(AppError::NotFound)?;
        let method = req
            .method
            .as_ref()
            .map(|m| m.to_uppercase())
            .unwrap_or(existing.method);
        let api_path = req.api_path.clone().unwrap_or(existing.api_path);

        if let Some(conflict) = repo.find_by_method_and_path(&method, &api_path).await? {
            if conflict.id != id {
                return Err(AppError::BadRequest(format!(
                    "Permission with apiPath={}, method={} already exists",
                    api_path, method
                )));
            }
        }
    }

    let permission = repo
        .update(id, &req, current_user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(permission))
}

/// 软删除权限
pub async fn delete_permission(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = PermissionRepository::new(state.db.clone())
        .soft_delete(id, current_user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "deleted": true })))
}
