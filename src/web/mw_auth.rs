// src/web/mw_auth.rs
use crate::{error::AppError, models::user::User, services::user_service, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Session key holding the logged-in user's id.
pub const USER_ID_KEY: &str = "user_id";

/// The logged-in user, placed in request extensions by `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Loads the session's user or sends the visitor to the login page.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session.get::<i64>(USER_ID_KEY).await.map_err(|e| {
        tracing::error!("Auth MW: could not read session: {:?}", e);
        AppError::SessionError(format!("Could not verify session: {}", e))
    })?;

    let Some(user_id) = user_id else {
        tracing::debug!("Auth MW: anonymous request to {}, redirecting to /login", request.uri());
        return Ok(login_redirect(&request).into_response());
    };

    match user_service::find_user_by_id(&state.db_pool, user_id).await? {
        Some(user) => {
            tracing::debug!("Auth MW: user '{}' authenticated.", user.username);
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        None => {
            // The account disappeared while the session was alive
            tracing::warn!("Auth MW: session points at missing user {}; clearing it.", user_id);
            session.flush().await?;
            Ok(login_redirect(&request).into_response())
        }
    }
}

fn login_redirect(request: &Request) -> Redirect {
    let next = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/index");
    Redirect::to(&format!("/login?next={}", urlencoding::encode(next)))
}
