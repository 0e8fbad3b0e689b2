// src/web/mw_role.rs
//! Role gates. They run *after* `require_auth`, which supplies `CurrentUser`.
use crate::{
    error::AppError,
    models::user::User,
    web::{flash, mw_auth::CurrentUser},
};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

pub const DENIED_MESSAGE: &str = "You do not have permission to view that page.";

async fn gate(
    session: Session,
    user: &User,
    allowed: bool,
    gate_name: &str,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if allowed {
        return Ok(next.run(request).await);
    }
    tracing::warn!(
        "{} MW: access to {} denied for '{}' ({}).",
        gate_name,
        request.uri(),
        user.username,
        user.role_name()
    );
    flash::error(&session, DENIED_MESSAGE).await?;
    Ok(Redirect::to("/index").into_response())
}

/// Any role except unverified.
pub async fn require_verified(
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let allowed = user.is_verified();
    gate(session, &user, allowed, "Verified", request, next).await
}

/// Lecturers and admins.
pub async fn require_staff(
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let allowed = user.is_staff();
    gate(session, &user, allowed, "Staff", request, next).await
}

pub async fn require_admin(
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let allowed = user.is_admin();
    gate(session, &user, allowed, "Admin", request, next).await
}
