// src/services/post_service.rs
use crate::{error::AppResult, models::post::Post};
use chrono::Utc;
use sqlx::SqlitePool;

const POST_SELECT: &str = r#"
    SELECT p.id, p.body, p.timestamp, u.username AS author
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

pub async fn create_post(db_pool: &SqlitePool, user_id: i64, body: &str) -> AppResult<i64> {
    let id = sqlx::query("INSERT INTO posts (body, timestamp, user_id) VALUES (?1, ?2, ?3)")
        .bind(body)
        .bind(Utc::now())
        .bind(user_id)
        .execute(db_pool)
        .await?
        .last_insert_rowid();
    tracing::info!("Post {} created by user {}", id, user_id);
    Ok(id)
}

/// Every post, newest first.
pub async fn list_posts(db_pool: &SqlitePool) -> AppResult<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        "{POST_SELECT} ORDER BY p.timestamp DESC, p.id DESC"
    ))
    .fetch_all(db_pool)
    .await?;
    Ok(posts)
}

pub async fn list_posts_by_user(db_pool: &SqlitePool, user_id: i64) -> AppResult<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        "{POST_SELECT} WHERE p.user_id = ?1 ORDER BY p.timestamp DESC, p.id DESC"
    ))
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;
    Ok(posts)
}

pub async fn find_post(db_pool: &SqlitePool, post_id: i64) -> AppResult<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(&format!("{POST_SELECT} WHERE p.id = ?1"))
        .bind(post_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(post)
}

/// Returns false when the post did not exist.
pub async fn delete_post(db_pool: &SqlitePool, post_id: i64) -> AppResult<bool> {
    let rows = sqlx::query("DELETE FROM posts WHERE id = ?1")
        .bind(post_id)
        .execute(db_pool)
        .await?
        .rows_affected();
    if rows > 0 {
        tracing::info!("Post {} deleted", post_id);
    }
    Ok(rows > 0)
}
