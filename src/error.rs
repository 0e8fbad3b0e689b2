// src/error.rs
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Password processing failed")]
    PasswordHashingError,

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Template render error: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed upload: {0}")]
    MultipartError(String),

    #[error("Upload exceeds the size limit")]
    UploadTooLarge,

    #[error("Unexpected internal error")]
    InternalServerError,
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        // Body limit violations surface as a multipart error with status 413
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::UploadTooLarge
        } else {
            AppError::MultipartError(e.body_text())
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::SessionError(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Request failed: {:?}", self);

        let (status, user_message) = match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not access the data.")
            }
            AppError::EnvVarError(_) | AppError::ConfigError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error.")
            }
            AppError::PasswordHashingError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not process credentials.")
            }
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Your session could not be handled.")
            }
            AppError::AlreadyExists(_) => (StatusCode::CONFLICT, "That record already exists."),
            AppError::MultipartError(_) => (StatusCode::BAD_REQUEST, "The upload was malformed."),
            AppError::UploadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "The file is too large."),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred."),
        };

        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Error</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Error {status_code}</h1><p>{message}</p><a href="/index">Home</a></body></html>
         "#, status_code=status.as_u16(), message=user_message))).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;
