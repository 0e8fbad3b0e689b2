// src/models/post.rs
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const POST_BODY_MAX: usize = 140;

/// A board post joined with its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
}

impl Post {
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M %d/%m/%y").to_string()
    }
}
