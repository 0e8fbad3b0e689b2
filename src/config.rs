// src/config.rs
use crate::error::{AppError, AppResult};
use sha2::{Digest, Sha512};
use std::{env, net::SocketAddr, path::PathBuf};
use tower_sessions::cookie::Key;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let session_secret = env::var("SESSION_SECRET")?;

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| AppError::ConfigError(format!("BIND_ADDR '{raw}': {e}")))?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .map(|raw| parse_extensions(&raw))
            .unwrap_or_else(|_| default_extensions());
        if allowed_extensions.is_empty() {
            return Err(AppError::ConfigError("ALLOWED_EXTENSIONS is empty".into()));
        }

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| AppError::ConfigError(format!("MAX_UPLOAD_BYTES '{raw}': {e}")))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Config {
            database_url,
            session_secret,
            bind_addr,
            upload_dir,
            allowed_extensions,
            max_upload_bytes,
        })
    }

    /// Cookie signing key. Secrets shorter than 64 bytes are stretched with SHA-512.
    pub fn session_key(&self) -> Key {
        let secret = self.session_secret.as_bytes();
        if secret.len() >= 64 {
            return Key::from(secret);
        }
        tracing::warn!("⚠️ SESSION_SECRET is short, consider a longer random value!");
        Key::from(Sha512::digest(secret).as_slice())
    }
}

pub fn default_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// "PNG, .jpg ,gif" -> ["png", "jpg", "gif"]
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
