//! 认证 API 集成测试
//! 需要 PostgreSQL，通过 TEST_DATABASE_URL 指定测试库

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{create_test_app_state, create_test_user, setup_test_db};

fn test_app(pool: sqlx::PgPool) -> Router {
    jobboard::routes::create_router(create_test_app_state(pool))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 从 Set-Cookie 头中取出 refresh_token cookie
fn refresh_cookie_value(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|s| s.starts_with("refresh_token="))
        .filter(|s| !s.starts_with("refresh_token=;"))
        .map(|s| s.split(';').next().unwrap().to_string())
        .next()
}

async fn login_request(app: &Router, username: &str, password: &str) -> axum::response::Response {
    app.clone()
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
        .unwrap()
}

async fn refresh_request(app: &Router, cookie: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/auth/refresh")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_login_success_sets_refresh_cookie() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    create_test_user(&pool, "Test User", "test@example.com", "TestPass123", None).await;

    let app = test_app(pool);
    let response = login_request(&app, "test@example.com", "TestPass123").await;

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = refresh_cookie_value(&response).expect("refresh cookie not set");
    assert!(cookie.starts_with("refresh_token="));

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("/api/v1/auth"));

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    // 刷新令牌不进响应体
    assert!(json.get("refresh_token").is_none());
    assert_eq!(json["user"]["email"], "test@example.com");
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_login_wrong_password() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    create_test_user(&pool, "Test User", "test@example.com", "TestPass123", None).await;

    let app = test_app(pool);
    let response = login_request(&app, "test@example.com", "WrongPassword").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_login_unknown_user_is_indistinguishable() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    create_test_user(&pool, "Test User", "test@example.com", "TestPass123", None).await;

    let app = test_app(pool);

    let unknown = login_request(&app, "nobody@example.com", "TestPass123").await;
    let wrong = login_request(&app, "test@example.com", "WrongPassword").await;

    // 账号不存在与密码错误必须不可区分
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown_json = body_json(unknown).await;
    let wrong_json = body_json(wrong).await;
    assert_eq!(unknown_json["error"]["message"], wrong_json["error"]["message"]);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_get_account_with_token() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    create_test_user(&pool, "Test User", "test@example.com", "TestPass123", None).await;

    let app = test_app(pool);
    let login = login_request(&app, "test@example.com", "TestPass123").await;
    let access_token = body_json(login).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/auth/account")
                .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "test@example.com");
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_refresh_rotation_rejects_superseded_token() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    create_test_user(&pool, "Test User", "test@example.com", "TestPass123", None).await;

    let app = test_app(pool);
    let login = login_request(&app, "test@example.com", "TestPass123").await;
    let first_cookie = refresh_cookie_value(&login).unwrap();

    // 第一次刷新：成功并轮换
    let refresh1 = refresh_request(&app, &first_cookie).await;
    assert_eq!(refresh1.status(), StatusCode::OK);
    let second_cookie = refresh_cookie_value(&refresh1).unwrap();
    assert_ne!(first_cookie, second_cookie);

    // 第二次刷新：用新令牌再次成功
    let refresh2 = refresh_request(&app, &second_cookie).await;
    assert_eq!(refresh2.status(), StatusCode::OK);

    // 第三次刷新：第一次拿到的令牌已被轮换覆盖，必须被拒绝
    let replay = refresh_request(&app, &first_cookie).await;
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_logout_invalidates_stored_refresh_token() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    create_test_user(&pool, "Test User", "test@example.com", "TestPass123", None).await;

    let app = test_app(pool);
    let login = login_request(&app, "test@example.com", "TestPass123").await;
    let cookie = refresh_cookie_value(&login).unwrap();
    let access_token = body_json(login).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    // cookie 即使被窃取，槽已清空，刷新也会失败
    let replay = refresh_request(&app, &cookie).await;
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_register_then_login() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "New Candidate",
                        "email": "candidate@example.com",
                        "password": "TestPass123"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["id"].is_string());

    let login = login_request(&app, "candidate@example.com", "TestPass123").await;
    assert_eq!(login.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_register_duplicate_email() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;

    create_test_user(&pool, "Test User", "taken@example.com", "TestPass123", None).await;

    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "Imposter",
                        "email": "taken@example.com",
                        "password": "TestPass123"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
