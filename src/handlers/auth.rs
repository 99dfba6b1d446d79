//! 认证相关的 HTTP 处理器
//!
//! 刷新令牌只通过 HTTP-only cookie 往返，作用域限定在认证模块
//! 挂载前缀下，max-age 与刷新令牌有效期一致。

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::auth::*,
    models::user::RegisterRequest,
    routes::AUTH_ROUTE_PREFIX,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 刷新令牌 cookie 名
pub const REFRESH_COOKIE: &str = "refresh_token";

fn refresh_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, value))
        .path(AUTH_ROUTE_PREFIX)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            state.jwt_service.refresh_token_exp_secs() as i64,
        ))
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, "")).path(AUTH_ROUTE_PREFIX).build()
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .auth_service
        .validate_user(&req.username, &req.password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let (response, refresh_token) = state.auth_service.login(user).await?;

    let jar = jar
        .remove(removal_cookie())
        .add(refresh_cookie(&state, refresh_token));

    Ok((jar, Json(response)))
}

/// 注册新用户
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let response = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// 刷新令牌对
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AppError::RefreshRejected)?;

    let (response, new_refresh_token) = state.auth_service.refresh(&presented).await?;

    let jar = jar
        .remove(removal_cookie())
        .add(refresh_cookie(&state, new_refresh_token));

    Ok((jar, Json(response)))
}

/// 获取当前账号信息
pub async fn get_account(current_user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({
        "user": {
            "id": current_user.id,
            "name": current_user.name,
            "email": current_user.email,
            "role": current_user.role,
            "permissions": current_user.permissions,
        }
    })))
}

/// 登出：清空刷新令牌槽并移除 cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(current_user.id).await?;

    let jar = jar.remove(removal_cookie());

    Ok((jar, Json(json!({ "message": "ok" }))))
}
