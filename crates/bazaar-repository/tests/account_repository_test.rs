//! Integration tests for the user and access token repositories.
//!
//! These run against a real MySQL database through testcontainers and
//! require Docker.

mod common;

use bazaar_core::{AccessToken, BazaarError, Email, TokenId, User, UserRole};
use bazaar_repository::{
    AccessTokenRepository, MySqlAccessTokenRepository, MySqlUserRepository, UserRepository,
};
use chrono::{Duration, Utc};
use common::TestDatabase;

fn create_test_user(username: &str, email: &str) -> User {
    User::new(
        username.to_string(),
        Email::new_unchecked(email),
        "hashed_password_123".to_string(),
    )
}

#[tokio::test]
async fn test_save_and_find_user() {
    let db = TestDatabase::new().await;
    let repo = MySqlUserRepository::new(db.pool());

    let user = create_test_user("jane", "Jane@Example.com");
    let saved = repo.save(&user).await.unwrap();
    assert_eq!(saved.id, user.id);
    assert_eq!(saved.role, UserRole::Customer);

    let by_email = repo
        .find_by_username_or_email("JANE@example.COM")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);

    assert!(repo.exists_by_username("jane").await.unwrap());
    assert!(!repo.exists_by_username("john").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = MySqlUserRepository::new(db.pool());

    repo.save(&create_test_user("dupe", "one@example.com")).await.unwrap();
    let err = repo
        .save(&create_test_user("dupe", "two@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, BazaarError::Conflict(_)));
}

#[tokio::test]
async fn test_update_and_delete_user() {
    let db = TestDatabase::new().await;
    let repo = MySqlUserRepository::new(db.pool());

    let mut user = repo.save(&create_test_user("seller1", "s1@example.com")).await.unwrap();
    user.change_role(UserRole::Seller);
    let updated = repo.update(&user).await.unwrap();
    assert_eq!(updated.role, UserRole::Seller);

    assert!(repo.delete(user.id).await.unwrap());
    assert!(!repo.delete(user.id).await.unwrap());
    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_token_delete_is_idempotent() {
    let db = TestDatabase::new().await;
    let users = MySqlUserRepository::new(db.pool());
    let tokens = MySqlAccessTokenRepository::new(db.pool());

    let user = users.save(&create_test_user("tok", "tok@example.com")).await.unwrap();
    let token = AccessToken::issue(user.id, "login", Duration::minutes(5), Utc::now());
    tokens.save(&token).await.unwrap();

    let found = tokens.find_by_id(token.id).await.unwrap().unwrap();
    assert_eq!(found.user_id, user.id);

    assert!(tokens.delete(token.id).await.unwrap());
    assert!(!tokens.delete(token.id).await.unwrap());
    assert!(!tokens.delete(TokenId::new()).await.unwrap());
}

#[tokio::test]
async fn test_touch_and_cascade_on_user_delete() {
    let db = TestDatabase::new().await;
    let users = MySqlUserRepository::new(db.pool());
    let tokens = MySqlAccessTokenRepository::new(db.pool());

    let user = users.save(&create_test_user("cascade", "c@example.com")).await.unwrap();
    let token = AccessToken::issue(user.id, "login", Duration::minutes(5), Utc::now());
    tokens.save(&token).await.unwrap();

    tokens.touch(token.id, Utc::now()).await.unwrap();
    let touched = tokens.find_by_id(token.id).await.unwrap().unwrap();
    assert!(touched.last_used_at.is_some());

    users.delete(user.id).await.unwrap();
    assert!(tokens.find_by_id(token.id).await.unwrap().is_none());
}
