// src/services/file_service.rs
use crate::{
    error::AppResult,
    models::{
        file::{NewFile, StoredFile},
        user::User,
    },
};
use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FILE_SELECT: &str = r#"
    SELECT f.id, f.filename, f.path, f.title, f.description, f.timestamp, f.user_id,
           u.username AS uploader, s.id AS submission_id
    FROM files f
    JOIN users u ON u.id = f.user_id
    LEFT JOIN submissions s ON s.file_id = f.id
"#;

/// Longest name kept from the client's filename, before the unique prefix.
const MAX_NAME_LEN: usize = 100;

/// True when `filename` has an extension from `allowed` (case-insensitive).
pub fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Reduces a client-supplied name to `[A-Za-z0-9._-]`, without directories
/// or leading dots.
pub fn secure_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']);

    // Keep the extension when trimming long names
    let cleaned = if cleaned.len() > MAX_NAME_LEN {
        match cleaned.rsplit_once('.') {
            Some((stem, ext)) if ext.len() < 10 => {
                format!("{}.{}", &stem[..MAX_NAME_LEN - ext.len() - 1], ext)
            }
            _ => cleaned[..MAX_NAME_LEN].to_string(),
        }
    } else {
        cleaned.to_string()
    };

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// A collision-free name for storing `raw` on disk.
pub fn unique_filename(raw: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), secure_filename(raw))
}

/// Writes the bytes under `upload_dir`, creating the directory when needed.
pub async fn save_to_disk(upload_dir: &Path, filename: &str, data: &[u8]) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = upload_dir.join(filename);
    tokio::fs::write(&path, data).await?;
    tracing::debug!("Stored {} bytes at {}", data.len(), path.display());
    Ok(path)
}

pub async fn remove_from_disk(path: &str) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Could not remove {}: {}", path, e);
    }
}

pub(crate) async fn insert_file(conn: &mut SqliteConnection, file: &NewFile<'_>) -> AppResult<i64> {
    let id = sqlx::query::<Sqlite>(
        r#"
        INSERT INTO files (filename, path, title, description, timestamp, user_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(file.filename)
    .bind(file.path)
    .bind(file.title)
    .bind(file.description)
    .bind(Utc::now())
    .bind(file.user_id)
    .execute(conn)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn create_file(db_pool: &SqlitePool, file: &NewFile<'_>) -> AppResult<i64> {
    let mut conn = db_pool.acquire().await?;
    let id = insert_file(&mut *conn, file).await?;
    tracing::info!("File {} ('{}') uploaded by user {}", id, file.filename, file.user_id);
    Ok(id)
}

/// Files shared through the upload page, newest first.
/// Submission files are only reachable from their assignment.
pub async fn list_shared_files(db_pool: &SqlitePool) -> AppResult<Vec<StoredFile>> {
    let files = sqlx::query_as::<_, StoredFile>(&format!(
        "{FILE_SELECT} WHERE s.id IS NULL ORDER BY f.timestamp DESC, f.id DESC"
    ))
    .fetch_all(db_pool)
    .await?;
    Ok(files)
}

pub async fn find_file_by_id(db_pool: &SqlitePool, file_id: i64) -> AppResult<Option<StoredFile>> {
    let file = sqlx::query_as::<_, StoredFile>(&format!("{FILE_SELECT} WHERE f.id = ?1"))
        .bind(file_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(file)
}

pub async fn find_file_by_name(db_pool: &SqlitePool, filename: &str) -> AppResult<Option<StoredFile>> {
    let file = sqlx::query_as::<_, StoredFile>(&format!("{FILE_SELECT} WHERE f.filename = ?1"))
        .bind(filename)
        .fetch_optional(db_pool)
        .await?;
    Ok(file)
}

/// Shared files are open to every user. A submission file is open to its
/// submitter, the assignment's author and admins.
pub async fn can_view(db_pool: &SqlitePool, file: &StoredFile, viewer: &User) -> AppResult<bool> {
    let Some(submission_id) = file.submission_id else {
        return Ok(true);
    };
    if viewer.is_admin() || viewer.id == file.user_id {
        return Ok(true);
    }

    let author: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT a.user_id
        FROM submissions s
        JOIN assignments a ON a.id = s.assignment_id
        WHERE s.id = ?1
        "#,
    )
    .bind(submission_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(author == Some(viewer.id))
}

pub fn can_delete(file: &StoredFile, user: &User) -> bool {
    file.submission_id.is_none() && (user.is_admin() || user.id == file.user_id)
}

/// Deletes the row and the stored bytes. Returns false when the row was gone.
pub async fn delete_file(db_pool: &SqlitePool, file: &StoredFile) -> AppResult<bool> {
    let rows = sqlx::query("DELETE FROM files WHERE id = ?1")
        .bind(file.id)
        .execute(db_pool)
        .await?
        .rows_affected();
    if rows == 0 {
        return Ok(false);
    }
    remove_from_disk(&file.path).await;
    tracing::info!("File {} ('{}') deleted", file.id, file.filename);
    Ok(true)
}
