// src/models/file.rs
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// An uploaded file with its uploader's username.
/// `submission_id` is set when the file was handed in for an assignment.
#[derive(Debug, Clone, FromRow)]
pub struct StoredFile {
    pub id: i64,
    pub filename: String,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub uploader: String,
    pub submission_id: Option<i64>,
}

impl StoredFile {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("Untitled")
    }

    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M %d/%m/%y").to_string()
    }
}

/// Fields needed to insert a row in `files`.
#[derive(Debug, Clone)]
pub struct NewFile<'a> {
    pub filename: &'a str,
    pub path: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub user_id: i64,
}
