//! 初始数据写入
//! 首次启动时创建权限目录、默认角色与种子账号

use crate::{config::AppConfig, error::AppError, services::auth_service::hash_password};
use once_cell::sync::Lazy;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// 管理员角色名，该角色永远不可删除
pub const ADMIN_ROLE: &str = "SUPER_ADMIN";
/// 注册用户的默认角色名
pub const USER_ROLE: &str = "NORMAL_USER";
/// 种子管理员账号，该账号永远不可删除
pub const ADMIN_EMAIL: &str = "admin@gmail.com";

struct SeedPermission {
    method: &'static str,
    api_path: &'static str,
    name: &'static str,
    module: &'static str,
}

macro_rules! perm {
    ($method:expr, $path:expr, $name:expr, $module:expr) => {
        SeedPermission {
            method: $method,
            api_path: $path,
            name: $name,
            module: $module,
        }
    };
}

/// 初始权限目录：每个受保护端点一条 (method, apiPath)
static INIT_PERMISSIONS: Lazy<Vec<SeedPermission>> = Lazy::new(|| {
    vec![
        // USERS
        perm!("POST", "/api/v1/users", "Create user", "USERS"),
        perm!("GET", "/api/v1/users", "Fetch users with paginate", "USERS"),
        perm!("GET", "/api/v1/users/{id}", "Fetch user by id", "USERS"),
        perm!("PATCH", "/api/v1/users/{id}", "Update user", "USERS"),
        perm!("DELETE", "/api/v1/users/{id}", "Delete user", "USERS"),
        // ROLES
        perm!("POST", "/api/v1/roles", "Create role", "ROLES"),
        perm!("GET", "/api/v1/roles", "Fetch roles with paginate", "ROLES"),
        perm!("GET", "/api/v1/roles/{id}", "Fetch role by id", "ROLES"),
        perm!("PATCH", "/api/v1/roles/{id}", "Update role", "ROLES"),
        perm!("DELETE", "/api/v1/roles/{id}", "Delete role", "ROLES"),
        // PERMISSIONS
        perm!("POST", "/api/v1/permissions", "Create permission", "PERMISSIONS"),
        perm!("GET", "/api/v1/permissions", "Fetch permissions with paginate", "PERMISSIONS"),
        perm!("GET", "/api/v1/permissions/{id}", "Fetch permission by id", "PERMISSIONS"),
        perm!("PATCH", "/api/v1/permissions/{id}", "Update permission", "PERMISSIONS"),
        perm!("DELETE", "/api/v1/permissions/{id}", "Delete permission", "PERMISSIONS"),
        // COMPANIES
        perm!("POST", "/api/v1/companies", "Create company", "COMPANIES"),
        perm!("GET", "/api/v1/companies", "Fetch companies with paginate", "COMPANIES"),
        perm!("GET", "/api/v1/companies/{id}", "Fetch company by id", "COMPANIES"),
        perm!("PATCH", "/api/v1/companies/{id}", "Update company", "COMPANIES"),
        perm!("DELETE", "/api/v1/companies/{id}", "Delete company", "COMPANIES"),
        // JOBS
        perm!("POST", "/api/v1/jobs", "Create job", "JOBS"),
        perm!("GET", "/api/v1/jobs", "Fetch jobs with paginate", "JOBS"),
        perm!("GET", "/api/v1/jobs/{id}", "Fetch job by id", "JOBS"),
        perm!("PATCH", "/api/v1/jobs/{id}", "Update job", "JOBS"),
        perm!("DELETE", "/api/v1/jobs/{id}", "Delete job", "JOBS"),
        // RESUMES
        perm!("POST", "/api/v1/resumes", "Create resume", "RESUMES"),
        perm!("GET", "/api/v1/resumes", "Fetch resumes with paginate", "RESUMES"),
        perm!("GET", "/api/v1/resumes/{id}", "Fetch resume by id", "RESUMES"),
        perm!("PATCH", "/api/v1/resumes/{id}", "Update resume status", "RESUMES"),
        perm!("DELETE", "/api/v1/resumes/{id}", "Delete resume", "RESUMES"),
        perm!("POST", "/api/v1/resumes/by-user", "Fetch resumes by user", "RESUMES"),
        // SUBSCRIBERS
        perm!("POST", "/api/v1/subscribers", "Create subscriber", "SUBSCRIBERS"),
        perm!("GET", "/api/v1/subscribers", "Fetch subscribers with paginate", "SUBSCRIBERS"),
        perm!("GET", "/api/v1/subscribers/{id}", "Fetch subscriber by id", "SUBSCRIBERS"),
        perm!("DELETE", "/api/v1/subscribers/{id}", "Delete subscriber", "SUBSCRIBERS"),
    ]
});

/// 写入初始数据
///
/// 仅当 seed.enabled 为真且对应表为空时执行，可安全重复调用。
pub async fn run(db: &PgPool, config: &AppConfig) -> Result<(), AppError> {
    if !config.seed.enabled {
        return Ok(());
    }

    seed_permissions(db).await?;
    seed_roles(db).await?;
    seed_users(db, config).await?;

    tracing::info!("Seed data initialized");

    Ok(())
}

async fn table_is_empty(db: &PgPool, table: &str) -> Result<bool, AppError> {
    // 表名来自本模块内的常量调用，不接受外部输入
    let count: i64 = sqlx::query(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db)
        .await?
        .get(0);

    Ok(count == 0)
}

async fn seed_permissions(db: &PgPool) -> Result<(), AppError> {
    if !table_is_empty(db, "permissions").await? {
        return Ok(());
    }

    for p in INIT_PERMISSIONS.iter() {
        sqlx::query(
            "INSERT INTO permissions (name, api_path, method, module) VALUES ($1, $2, $3, $4)",
        )
        .bind(p.name)
        .bind(p.api_path)
        .bind(p.method)
        .bind(p.module)
        .execute(db)
        .await?;
    }

    tracing::info!(count = INIT_PERMISSIONS.len(), "Seeded permission catalogue");

    Ok(())
}

async fn seed_roles(db: &PgPool) -> Result<(), AppError> {
    if !table_is_empty(db, "roles").await? {
        return Ok(());
    }

    let admin_role_id: Uuid = sqlx::query(
        "INSERT INTO roles (name, description, is_active) VALUES ($1, $2, TRUE) RETURNING id",
    )
    .bind(ADMIN_ROLE)
    .bind("Full access to every endpoint")
    .fetch_one(db)
    .await?
    .get(0);

    sqlx::query("INSERT INTO roles (name, description, is_active) VALUES ($1, $2, TRUE)")
        .bind(USER_ROLE)
        .bind("Default role for registered candidates")
        .execute(db)
        .await?;

    // 管理员角色持有全部权限，普通用户角色不持有任何权限
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id) SELECT $1, id FROM permissions",
    )
    .bind(admin_role_id)
    .execute(db)
    .await?;

    tracing::info!("Seeded default roles");

    Ok(())
}

async fn seed_users(db: &PgPool, config: &AppConfig) -> Result<(), AppError> {
    use secrecy::ExposeSecret;

    if !table_is_empty(db, "users").await? {
        return Ok(());
    }

    let password_hash = hash_password(config.seed.init_password.expose_secret().clone()).await?;

    let admin_role_id: Option<Uuid> = sqlx::query("SELECT id FROM roles WHERE name = $1")
        .bind(ADMIN_ROLE)
        .fetch_optional(db)
        .await?
        .map(|row| row.get(0));

    let user_role_id: Option<Uuid> = sqlx::query("SELECT id FROM roles WHERE name = $1")
        .bind(USER_ROLE)
        .fetch_optional(db)
        .await?
        .map(|row| row.get(0));

    let seed_users: [(&str, &str, Option<Uuid>); 3] = [
        ("I'm admin", ADMIN_EMAIL, admin_role_id),
        ("I'm HR", "hr@gmail.com", admin_role_id),
        ("I'm normal user", "user@gmail.com", user_role_id),
    ];

    for (name, email, role_id) in seed_users {
        sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, age, gender, address, role_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(30)
        .bind("OTHER")
        .bind("Hanoi")
        .bind(role_id)
        .execute(db)
        .await?;
    }

    tracing::info!("Seeded default accounts");

    Ok(())
}
