// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::User,
    services::user_service,
};
use sqlx::SqlitePool;

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
// Minimum cost keeps the test suite fast
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

/// Checks a password against a stored bcrypt hash.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verifying bcrypt hash...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt verify failed: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Hashes a password with bcrypt.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generating bcrypt hash...");
        bcrypt::hash(&password, BCRYPT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt hash failed: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Returns the user when the username exists and the password matches.
pub async fn authenticate(
    db_pool: &SqlitePool,
    username: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let Some(user) = user_service::find_user_by_username(db_pool, username).await? else {
        tracing::warn!("Login attempt for unknown user '{}'", username);
        return Ok(None);
    };

    // Accounts without a hash cannot log in
    let Some(hash) = user.password_hash.as_deref() else {
        tracing::warn!("User '{}' has no password set", username);
        return Ok(None);
    };

    if verify_password(password, hash).await? {
        Ok(Some(user))
    } else {
        tracing::warn!("Wrong password for '{}'", username);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_pool, models::user::Role};

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("cat").await.unwrap();
        assert!(verify_password("cat", &hash).await.unwrap());
        assert!(!verify_password("dog", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn authenticate_checks_username_and_password() {
        let pool = test_pool().await;
        user_service::create_user(&pool, "susan", "susan@example.com", "cat", Role::Student)
            .await
            .unwrap();

        let ok = authenticate(&pool, "susan", "cat").await.unwrap();
        assert_eq!(ok.map(|u| u.username), Some("susan".to_string()));
        assert!(authenticate(&pool, "susan", "dog").await.unwrap().is_none());
        assert!(authenticate(&pool, "john", "cat").await.unwrap().is_none());
    }
}
