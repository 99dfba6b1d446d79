//! 认证与鉴权中间件
//!
//! 每个请求的判定流程：
//! 公开路由直接放行 → 验证访问令牌 → 解析角色权限集 →
//! 跳过检查/认证模块豁免/精确匹配三者其一成立则放行，否则 403。

use axum::{
    extract::{FromRequestParts, MatchedPath, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::AppState,
    models::{permission::PermissionGrant, role::RoleRef},
    routes::{RoutePolicy, AUTH_ROUTE_PREFIX},
};

/// 当前用户（附加到请求扩展）
///
/// handler 通过提取器拿到它，从不直接调用鉴权组件。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Option<RoleRef>,
    /// 本次请求解析出的权限集
    pub permissions: Vec<PermissionGrant>,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::TokenMalformed)
    }
}

/// 从 Authorization 头提取 Bearer 令牌
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .ok_or(AppError::TokenMalformed)
}

/// 鉴权判定
///
/// 匹配使用路由声明的路径模板与 HTTP 方法的精确字符串相等，
/// 不做前缀或通配匹配。认证模块自身的路由无条件放行，
/// 保证恢复访问的通道始终可达。
pub fn authorize(
    policy: RoutePolicy,
    method: &Method,
    route_path: &str,
    permissions: &[PermissionGrant],
) -> bool {
    if policy.skip_permission_check {
        return true;
    }

    if route_path.starts_with(AUTH_ROUTE_PREFIX) {
        return true;
    }

    permissions
        .iter()
        .any(|p| p.method == method.as_str() && p.api_path == route_path)
}

/// 认证 + 鉴权中间件
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = req.method().clone();

    // 权限匹配针对路由声明的路径模板，而非具体 URL
    let route_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let policy = state.route_table.policy(&method, &route_path);

    // 公开路由不验证令牌
    if policy.public {
        return Ok(next.run(req).await);
    }

    let token = extract_token(req.headers())?;
    let claims = state.jwt_service.validate_access_token(&token)?;

    // 每次请求重新解析权限集，角色/权限的修改即刻生效
    let permissions = state
        .permission_service
        .resolve(claims.role.as_ref().map(|r| r.id))
        .await?;

    if !authorize(policy, &method, &route_path, &permissions) {
        tracing::warn!(
            user_id = %claims.id,
            method = %method,
            route = %route_path,
            "Permission denied"
        );
        return Err(AppError::PermissionDenied);
    }

    req.extensions_mut().insert(CurrentUser {
        id: claims.id,
        name: claims.name,
        email: claims.email,
        role: claims.role,
        permissions,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grants(entries: &[(&str, &str)]) -> Vec<PermissionGrant> {
        entries
            .iter()
            .map(|(method, api_path)| PermissionGrant {
                method: method.to_string(),
                api_path: api_path.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_exact_match_allows() {
        let permissions = grants(&[("GET", "/api/v1/jobs/{id}")]);
        assert!(authorize(
            RoutePolicy::default(),
            &Method::GET,
            "/api/v1/jobs/{id}",
            &permissions
        ));
    }

    #[test]
    fn test_method_mismatch_denies() {
        let permissions = grants(&[("GET", "/api/v1/jobs/{id}")]);
        assert!(!authorize(
            RoutePolicy::default(),
            &Method::POST,
            "/api/v1/jobs/{id}",
            &permissions
        ));
    }

    #[test]
    fn test_subpath_denies() {
        // 精确相等，不做前缀匹配
        let permissions = grants(&[("GET", "/api/v1/jobs/{id}")]);
        assert!(!authorize(
            RoutePolicy::default(),
            &Method::GET,
            "/api/v1/jobs/{id}/history",
            &permissions
        ));
    }

    #[test]
    fn test_auth_prefix_bypasses_empty_permission_set() {
        assert!(authorize(
            RoutePolicy::default(),
            &Method::POST,
            "/api/v1/auth/logout",
            &[]
        ));
        assert!(authorize(
            RoutePolicy::default(),
            &Method::GET,
            "/api/v1/auth/account",
            &[]
        ));
    }

    #[test]
    fn test_skip_permission_check_allows_without_grants() {
        let policy = RoutePolicy {
            public: false,
            skip_permission_check: true,
        };
        assert!(authorize(policy, &Method::PATCH, "/api/v1/subscribers", &[]));
    }

    #[test]
    fn test_empty_permission_set_denies_resource_route() {
        assert!(!authorize(
            RoutePolicy::default(),
            &Method::GET,
            "/api/v1/companies",
            &[]
        ));
    }

    #[test]
    fn test_extract_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_token(&headers).unwrap(), "abc.def.ghi");

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert!(extract_token(&headers).is_err());

        assert!(extract_token(&HeaderMap::new()).is_err());
    }
}
