//! 鉴权决策集成测试
//! 令牌校验路径不触达数据库的用例直接运行；
//! 依赖权限数据的用例需要数据库，标记 ignore

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{create_lazy_pool, create_test_app_state, create_test_role, create_test_user, setup_test_db};

fn test_app(pool: sqlx::PgPool) -> Router {
    jobboard::routes::create_router(create_test_app_state(pool))
}

async fn login_for_token(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "username": username, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    json["access_token"].as_str().unwrap().to_string()
}

async fn get_with_token(app: &Router, uri: &str, token: Option<&str>) -> StatusCode {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    // 令牌缺失在触达数据库之前就被拒绝
    let app = test_app(create_lazy_pool());

    let status = get_with_token(&app, "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token_is_unauthorized() {
    let app = test_app(create_lazy_pool());

    let status = get_with_token(&app, "/api/v1/users", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_is_unauthorized() {
    let app = test_app(create_lazy_pool());

    // 用别的密钥签出的令牌
    let foreign = jobboard::auth::jwt::JwtService::new(
        "a-completely-different-access-secret!!!!",
        "a-completely-different-refresh-secret!!!",
        300,
        3600,
    )
    .unwrap();
    let token = foreign
        .issue_access_token(&jobboard::models::auth::TokenUser {
            id: uuid::Uuid::new_v4(),
            name: "Intruder".to_string(),
            email: "intruder@example.com".to_string(),
            role: None,
        })
        .unwrap();

    let status = get_with_token(&app, "/api/v1/users", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_without_cookie_is_rejected() {
    let app = test_app(create_lazy_pool());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/auth/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_public_route_needs_no_token() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    let app = test_app(pool);

    // 未携带 Authorization 头也能到达 handler
    let status = get_with_token(&app, "/api/v1/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_zero_permission_role_is_forbidden_on_resources() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    let role_id = create_test_role(&pool, "NORMAL_USER", &[]).await;
    create_test_user(&pool, "Normal", "user@example.com", "TestPass123", Some(role_id)).await;

    let app = test_app(pool);
    let token = login_for_token(&app, "user@example.com", "TestPass123").await;

    // 没有任何权限：资源路由一律 403
    let status = get_with_token(&app, "/api/v1/companies", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let status = get_with_token(&app, "/api/v1/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_zero_permission_role_can_still_logout() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    let role_id = create_test_role(&pool, "NORMAL_USER", &[]).await;
    create_test_user(&pool, "Normal", "user@example.com", "TestPass123", Some(role_id)).await;

    let app = test_app(pool);
    let token = login_for_token(&app, "user@example.com", "TestPass123").await;

    // 认证模块自身的路由豁免权限检查，恢复通道始终可达
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_permission_match_is_exact() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    // 只授予 GET /api/v1/users
    let role_id = create_test_role(&pool, "VIEWER", &[("GET", "/api/v1/users")]).await;
    create_test_user(&pool, "Viewer", "viewer@example.com", "TestPass123", Some(role_id)).await;

    let app = test_app(pool);
    let token = login_for_token(&app, "viewer@example.com", "TestPass123").await;

    // 精确匹配的 (method, apiPath) 放行
    let status = get_with_token(&app, "/api/v1/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    // 方法不同：拒绝
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 路径模板不同（子路径）：拒绝
    let status = get_with_token(
        &app,
        &format!("/api/v1/users/{}", uuid::Uuid::new_v4()),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_skip_permission_check_route() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    let role_id = create_test_role(&pool, "NORMAL_USER", &[]).await;
    create_test_user(&pool, "Normal", "user@example.com", "TestPass123", Some(role_id)).await;

    sqlx::query("INSERT INTO subscribers (name, email, skills) VALUES ('Normal', 'user@example.com', '{rust}')")
        .execute(&pool)
        .await
        .unwrap();

    let app = test_app(pool);
    let token = login_for_token(&app, "user@example.com", "TestPass123").await;

    // 零权限角色也能访问 skip-check 路由
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/subscribers/skills")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_role_and_permission_edits_apply_on_next_request() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    let role_id = create_test_role(&pool, "VIEWER", &[("GET", "/api/v1/users")]).await;
    create_test_user(&pool, "Viewer", "viewer@example.com", "TestPass123", Some(role_id)).await;

    let app = test_app(pool.clone());
    let token = login_for_token(&app, "viewer@example.com", "TestPass123").await;

    let status = get_with_token(&app, "/api/v1/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    // 停用角色：同一个令牌的下一次请求立即失去权限
    sqlx::query("UPDATE roles SET is_active = FALSE WHERE id = $1")
        .bind(role_id)
        .execute(&pool)
        .await
        .unwrap();

    let status = get_with_token(&app, "/api/v1/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_admin_role_and_account_are_protected() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    let admin_role_id = create_test_role(
        &pool,
        "SUPER_ADMIN",
        &[
            ("DELETE", "/api/v1/roles/{id}"),
            ("DELETE", "/api/v1/users/{id}"),
        ],
    )
    .await;
    let admin_id =
        create_test_user(&pool, "I'm admin", "admin@gmail.com", "TestPass123", Some(admin_role_id))
            .await;

    let app = test_app(pool);
    let token = login_for_token(&app, "admin@gmail.com", "TestPass123").await;

    // 即使是管理员自己，也不能删除管理员角色
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/roles/{}", admin_role_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 种子管理员账号同样受保护
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/users/{}", admin_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
