//! 公司管理的 HTTP 处理器

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::company::*,
    models::page::{PageQuery, Paginated},
    repository::CompanyRepository,
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

/// 创建公司
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let company = CompanyRepository::new(state.db.clone())
        .create(&req, current_user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

/// 分页列出公司
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (current, limit, offset) = page.normalize();
    let repo = CompanyRepository::new(state.db.clone());

    let total = repo.count().await?;
    let companies = repo.list(limit, offset).await?;

    Ok(Json(Paginated::new(current, limit, total, companies)))
}

/// 获取单个公司
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = CompanyRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(company))
}

/// 更新公司
pub async fn update_company(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let company = CompanyRepository::new(state.db.clone())
        .update(id, &req, current_user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(company))
}

/// 软删除公司
pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = CompanyRepository::new(state.db.clone())
        .soft_delete(id, current_user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "deleted": true })))
}
