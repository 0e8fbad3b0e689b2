// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User},
};
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: i64) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by id: {}", user_id);
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

pub async fn find_user_by_username(db_pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by username: {}", username);
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
    ))
    .bind(username)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

pub async fn username_taken(db_pool: &SqlitePool, username: &str) -> AppResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?1")
        .bind(username)
        .fetch_one(db_pool)
        .await?;
    Ok(count > 0)
}

pub async fn email_taken(db_pool: &SqlitePool, email: &str) -> AppResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1")
        .bind(email)
        .fetch_one(db_pool)
        .await?;
    Ok(count > 0)
}

pub async fn find_all_users(db_pool: &SqlitePool) -> AppResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY username ASC"
    ))
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Found {} users.", users.len());
    Ok(users)
}

/// Inserts a new account and returns its id.
/// Duplicate usernames or e-mails come back as `AppError::AlreadyExists`.
pub async fn create_user(
    db_pool: &SqlitePool,
    username: &str,
    email: &str,
    raw_password: &str,
    role: Role,
) -> AppResult<i64> {
    tracing::info!("Creating user: {}", username);
    let password_hash = crate::services::auth_service::hash_password(raw_password).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, role, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(role.id())
    .bind(Utc::now())
    .execute(db_pool)
    .await;

    match result {
        Ok(done) => {
            tracing::info!("✅ User '{}' created.", username);
            Ok(done.last_insert_rowid())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::warn!("User '{}' not created: username or e-mail in use.", username);
            Err(AppError::AlreadyExists(format!("user '{username}'")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns false when no such user exists.
pub async fn set_user_role(db_pool: &SqlitePool, user_id: i64, role: Role) -> AppResult<bool> {
    tracing::info!("Setting role of user {} to {:?}", user_id, role);
    let rows_affected = sqlx::query("UPDATE users SET role = ?1 WHERE id = ?2")
        .bind(role.id())
        .bind(user_id)
        .execute(db_pool)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn new_users_are_found_by_name_and_id() {
        let pool = test_pool().await;
        let id = create_user(&pool, "john", "john@example.com", "pw", Role::Unverified)
            .await
            .unwrap();

        let by_name = find_user_by_username(&pool, "john").await.unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert_eq!(by_name.role(), Role::Unverified);
        assert_ne!(by_name.password_hash.as_deref(), Some("pw"));

        let by_id = find_user_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "john@example.com");
        assert!(find_user_by_id(&pool, id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let pool = test_pool().await;
        create_user(&pool, "john", "john@example.com", "pw", Role::Student)
            .await
            .unwrap();

        let same_name = create_user(&pool, "john", "other@example.com", "pw", Role::Student).await;
        assert!(matches!(same_name, Err(AppError::AlreadyExists(_))));
        let same_email = create_user(&pool, "johnny", "john@example.com", "pw", Role::Student).await;
        assert!(matches!(same_email, Err(AppError::AlreadyExists(_))));

        assert!(username_taken(&pool, "john").await.unwrap());
        assert!(email_taken(&pool, "john@example.com").await.unwrap());
        assert!(!username_taken(&pool, "susan").await.unwrap());
    }

    #[tokio::test]
    async fn role_updates() {
        let pool = test_pool().await;
        let id = create_user(&pool, "amy", "amy@example.com", "pw", Role::Unverified)
            .await
            .unwrap();
        assert!(set_user_role(&pool, id, Role::Lecturer).await.unwrap());
        let amy = find_user_by_id(&pool, id).await.unwrap().unwrap();
        assert!(amy.is_lecturer());
        assert!(!set_user_role(&pool, 999, Role::Admin).await.unwrap());
    }
}
