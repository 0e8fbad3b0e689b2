// src/web/flash.rs
//! One-shot messages carried in the session across a redirect.
use crate::{error::AppResult, models::user::User, templates::Nav};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const FLASH_KEY: &str = "_flashes";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

pub async fn push(session: &Session, category: &str, message: impl Into<String>) -> AppResult<()> {
    let mut flashes: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    flashes.push(Flash {
        category: category.to_string(),
        message: message.into(),
    });
    session.insert(FLASH_KEY, flashes).await?;
    Ok(())
}

pub async fn info(session: &Session, message: impl Into<String>) -> AppResult<()> {
    push(session, "info", message).await
}

pub async fn error(session: &Session, message: impl Into<String>) -> AppResult<()> {
    push(session, "error", message).await
}

/// Queues every validation message from a form.
pub async fn errors(session: &Session, messages: &[String]) -> AppResult<()> {
    for message in messages {
        push(session, "error", message.as_str()).await?;
    }
    Ok(())
}

/// Removes and returns the pending messages.
pub async fn take(session: &Session) -> AppResult<Vec<Flash>> {
    Ok(session.remove::<Vec<Flash>>(FLASH_KEY).await?.unwrap_or_default())
}

/// Navigation state for a page, consuming the pending messages.
pub async fn page_nav(session: &Session, user: Option<&User>) -> AppResult<Nav> {
    let flashes = take(session).await?;
    Ok(Nav::new(user, flashes))
}
