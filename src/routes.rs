//! 路由注册与路由策略表
//! 路由元数据在注册时一次性确定，由鉴权中间件按 (method, path) 查询

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{handlers, middleware::AppState};

/// 认证模块挂载前缀
///
/// 路由注册与鉴权豁免规则共享同一常量：
/// 重新挂载认证模块时豁免规则自动跟随。
pub const AUTH_ROUTE_PREFIX: &str = "/api/v1/auth";

/// 路由级标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    /// 无需令牌即可访问
    pub public: bool,
    /// 认证通过后跳过权限检查
    pub skip_permission_check: bool,
}

/// 公开路由标记
pub const PUBLIC: RoutePolicy = RoutePolicy {
    public: true,
    skip_permission_check: false,
};

/// 跳过权限检查标记
pub const SKIP_PERMISSION_CHECK: RoutePolicy = RoutePolicy {
    public: false,
    skip_permission_check: true,
};

/// 路由策略表
///
/// 只登记带标记的路由；未登记的路由取默认策略
/// （需要认证 + 权限检查）。
#[derive(Debug, Default)]
pub struct RouteTable {
    policies: HashMap<(Method, String), RoutePolicy>,
}

impl RouteTable {
    fn mark(&mut self, method: Method, path: &str, policy: RoutePolicy) {
        self.policies.insert((method, path.to_string()), policy);
    }

    /// 查询路由策略，未登记的路由返回默认值
    pub fn policy(&self, method: &Method, path: &str) -> RoutePolicy {
        self.policies
            .get(&(method.clone(), path.to_string()))
            .copied()
            .unwrap_or_default()
    }
}

/// 构建路由策略表
pub fn policy_table() -> RouteTable {
    let mut table = RouteTable::default();

    // 认证入口：未持有令牌也必须可达
    table.mark(Method::POST, &format!("{}/login", AUTH_ROUTE_PREFIX), PUBLIC);
    table.mark(Method::POST, &format!("{}/register", AUTH_ROUTE_PREFIX), PUBLIC);
    table.mark(Method::GET, &format!("{}/refresh", AUTH_ROUTE_PREFIX), PUBLIC);

    table.mark(Method::GET, "/health", PUBLIC);

    // 求职者浏览职位不需要账号；公司数据需要权限
    table.mark(Method::GET, "/api/v1/jobs", PUBLIC);
    table.mark(Method::GET, "/api/v1/jobs/{id}", PUBLIC);

    // 任何已认证用户都可以管理自己的订阅
    table.mark(Method::POST, "/api/v1/subscribers/skills", SKIP_PERMISSION_CHECK);
    table.mark(Method::PATCH, "/api/v1/subscribers", SKIP_PERMISSION_CHECK);

    table
}

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 认证模块（整体挂载在 AUTH_ROUTE_PREFIX 下）
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .route("/refresh", get(handlers::auth::refresh_token))
        .route("/account", get(handlers::auth::get_account))
        .route("/logout", post(handlers::auth::logout));

    // 资源 CRUD
    let resource_routes = Router::new()
        // 用户管理
        .route(
            "/api/v1/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            "/api/v1/users/{id}",
            get(handlers::user::get_user)
                .patch(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        // 角色管理
        .route(
            "/api/v1/roles",
            get(handlers::role::list_roles).post(handlers::role::create_role),
        )
        .route(
            "/api/v1/roles/{id}",
            get(handlers::role::get_role)
                .patch(handlers::role::update_role)
                .delete(handlers::role::delete_role),
        )
        // 权限管理
        .route(
            "/api/v1/permissions",
            get(handlers::permission::list_permissions).post(handlers::permission::create_permission),
        )
        .route(
            "/api/v1/permissions/{id}",
            get(handlers::permission::get_permission)
                .patch(handlers::permission::update_permission)
                .delete(handlers::permission::delete_permission),
        )
        // 公司
        .route(
            "/api/v1/companies",
            get(handlers::company::list_companies).post(handlers::company::create_company),
        )
        .route(
            "/api/v1/companies/{id}",
            get(handlers::company::get_company)
                .patch(handlers::company::update_company)
                .delete(handlers::company::delete_company),
        )
        // 职位
        .route(
            "/api/v1/jobs",
            get(handlers::job::list_jobs).post(handlers::job::create_job),
        )
        .route(
            "/api/v1/jobs/{id}",
            get(handlers::job::get_job)
                .patch(handlers::job::update_job)
                .delete(handlers::job::delete_job),
        )
        // 简历
        .route(
            "/api/v1/resumes",
            get(handlers::resume::list_resumes).post(handlers::resume::create_resume),
        )
        .route("/api/v1/resumes/by-user", post(handlers::resume::get_resumes_by_user))
        .route(
            "/api/v1/resumes/{id}",
            get(handlers::resume::get_resume)
                .patch(handlers::resume::update_resume)
                .delete(handlers::resume::delete_resume),
        )
        // 订阅者
        .route(
            "/api/v1/subscribers",
            get(handlers::subscriber::list_subscribers)
                .post(handlers::subscriber::create_subscriber)
                .patch(handlers::subscriber::update_subscriber),
        )
        .route("/api/v1/subscribers/skills", post(handlers::subscriber::get_skills))
        .route(
            "/api/v1/subscribers/{id}",
            get(handlers::subscriber::get_subscriber)
                .delete(handlers::subscriber::delete_subscriber),
        );

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest(AUTH_ROUTE_PREFIX, auth_routes)
        .merge(resource_routes)
        // 中间件顺序：请求追踪 → 认证/鉴权 → handler
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::auth_middleware,
        ))
        .layer(axum::middleware::from_fn(
            crate::middleware::request_tracking_middleware,
        ))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(2 * 1024 * 1024));

    // CORS（携带 cookie 的跨域请求需要精确的来源）
    if let Some(origin) = &state.config.server.cors_allowed_origin {
        match origin.parse::<axum::http::HeaderValue>() {
            Ok(value) => {
                router = router.layer(
                    tower_http::cors::CorsLayer::new()
                        .allow_origin(value)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PATCH,
                            Method::DELETE,
                        ])
                        .allow_headers([
                            axum::http::header::AUTHORIZATION,
                            axum::http::header::CONTENT_TYPE,
                        ])
                        .allow_credentials(true),
                );
            }
            Err(_) => {
                tracing::warn!(origin = %origin, "Invalid CORS origin, layer not applied");
            }
        }
    }

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmarked_route_requires_auth_and_permission() {
        let table = policy_table();
        let policy = table.policy(&Method::GET, "/api/v1/users");
        assert!(!policy.public);
        assert!(!policy.skip_permission_check);
    }

    #[test]
    fn test_login_is_public() {
        let table = policy_table();
        assert!(table.policy(&Method::POST, "/api/v1/auth/login").public);
        assert!(table.policy(&Method::POST, "/api/v1/auth/register").public);
        assert!(table.policy(&Method::GET, "/api/v1/auth/refresh").public);
    }

    #[test]
    fn test_public_is_method_specific() {
        let table = policy_table();
        assert!(table.policy(&Method::GET, "/api/v1/jobs").public);
        assert!(!table.policy(&Method::POST, "/api/v1/jobs").public);
    }

    #[test]
    fn test_company_reads_require_permission() {
        let table = policy_table();
        let policy = table.policy(&Method::GET, "/api/v1/companies");
        assert!(!policy.public);
        assert!(!policy.skip_permission_check);
    }

    #[test]
    fn test_skip_permission_check_markers() {
        let table = policy_table();
        let policy = table.policy(&Method::POST, "/api/v1/subscribers/skills");
        assert!(!policy.public);
        assert!(policy.skip_permission_check);
    }

    #[test]
    fn test_auth_routes_live_under_shared_prefix() {
        // 豁免规则依赖这一前缀，路由注册必须与其一致
        assert!("/api/v1/auth/login".starts_with(AUTH_ROUTE_PREFIX));
        assert!("/api/v1/auth/logout".starts_with(AUTH_ROUTE_PREFIX));
    }
}
