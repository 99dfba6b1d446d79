//! 密码哈希与策略测试

use jobboard::auth::password::PasswordHasher;
use jobboard::services::auth_service::hash_password;

#[test]
fn test_hash_and_verify_round_trip() {
    let hasher = PasswordHasher::new();
    let hash = hasher.hash("CorrectHorse1").unwrap();

    assert!(hasher.verify("CorrectHorse1", &hash).is_ok());
    assert!(hasher.verify("WrongHorse1", &hash).is_err());
}

#[test]
fn test_mutated_secret_fails_verification() {
    let hasher = PasswordHasher::new();
    let hash = hasher.hash("CorrectHorse1").unwrap();

    // 任何变形都不能通过
    assert!(hasher.verify("CorrectHorse1 ", &hash).is_err());
    assert!(hasher.verify("correcthorse1", &hash).is_err());
    assert!(hasher.verify("", &hash).is_err());
}

#[test]
fn test_salted_hashes_differ() {
    let hasher = PasswordHasher::new();
    let hash1 = hasher.hash("CorrectHorse1").unwrap();
    let hash2 = hasher.hash("CorrectHorse1").unwrap();

    assert_ne!(hash1, hash2);
}

#[tokio::test]
async fn test_hash_password_off_the_executor() {
    // spawn_blocking 包装的哈希入口
    let hash = hash_password("CorrectHorse1".to_string()).await.unwrap();
    assert!(PasswordHasher::new().verify("CorrectHorse1", &hash).is_ok());
}
