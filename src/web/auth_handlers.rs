// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    forms::{LoginForm, RegistrationForm},
    models::user::Role,
    services::{auth_service, user_service},
    state::AppState,
    templates::{render, LoginPage, RegisterPage},
    web::{
        flash::{self, page_nav},
        mw_auth::USER_ID_KEY,
    },
};
use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use time::Duration;
use tower_sessions::{Expiry, Session};

/// How long a "remember me" session survives without activity.
const REMEMBER_ME_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    next: Option<String>,
}

async fn is_logged_in(session: &Session) -> bool {
    session.get::<i64>(USER_ID_KEY).await.ok().flatten().is_some()
}

// GET /login
pub async fn show_login_form(
    session: Session,
    Query(params): Query<LoginParams>,
) -> AppResult<Response> {
    if is_logged_in(&session).await {
        tracing::debug!("GET /login: already logged in, redirecting to /index");
        return Ok(Redirect::to("/index").into_response());
    }

    let page = LoginPage {
        nav: page_nav(&session, None).await?,
        next: params.next.unwrap_or_default(),
    };
    Ok(render(page)?.into_response())
}

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Redirect> {
    tracing::info!("Login attempt for: {}", form.username);

    let back_to_form = || match form.safe_next() {
        Some(next) => Redirect::to(&format!("/login?next={}", urlencoding::encode(next))),
        None => Redirect::to("/login"),
    };

    let errors = form.validate();
    if !errors.is_empty() {
        flash::errors(&session, &errors).await?;
        return Ok(back_to_form());
    }

    let Some(user) =
        auth_service::authenticate(&state.db_pool, form.username.trim(), &form.password).await?
    else {
        flash::error(&session, "Invalid username or password").await?;
        return Ok(back_to_form());
    };

    // New id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Could not rotate id: {}", e)))?;
    session.insert(USER_ID_KEY, user.id).await?;
    session.set_expiry(Some(if form.remember() {
        Expiry::OnInactivity(Duration::days(REMEMBER_ME_DAYS))
    } else {
        Expiry::OnSessionEnd
    }));

    tracing::info!("✅ '{}' logged in (remember: {}).", user.username, form.remember());
    Ok(Redirect::to(form.safe_next().unwrap_or("/index")))
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let user_id: Option<i64> = session.get(USER_ID_KEY).await.ok().flatten();

    session
        .flush()
        .await
        .map_err(|e| AppError::SessionError(format!("Could not delete session: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("🚪 User {} logged out.", id),
        None => tracing::info!("🚪 Anonymous session closed."),
    }
    Ok(Redirect::to("/index"))
}

// GET /register
pub async fn show_register_form(session: Session) -> AppResult<Response> {
    if is_logged_in(&session).await {
        return Ok(Redirect::to("/index").into_response());
    }
    let page = RegisterPage {
        nav: page_nav(&session, None).await?,
    };
    Ok(render(page)?.into_response())
}

// POST /register
pub async fn handle_register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegistrationForm>,
) -> AppResult<Redirect> {
    if is_logged_in(&session).await {
        return Ok(Redirect::to("/index"));
    }

    let errors = form.validate(&state.db_pool).await?;
    if !errors.is_empty() {
        tracing::warn!("Registration of '{}' rejected: {:?}", form.username, errors);
        flash::errors(&session, &errors).await?;
        return Ok(Redirect::to("/register"));
    }

    // New accounts wait for an admin to assign a role
    match user_service::create_user(
        &state.db_pool,
        form.username.trim(),
        form.email.trim(),
        &form.password,
        Role::Unverified,
    )
    .await
    {
        Ok(_) => {
            flash::info(&session, "Congratulations, you are now a registered user!").await?;
            Ok(Redirect::to("/login"))
        }
        // Lost a race with a concurrent registration
        Err(AppError::AlreadyExists(_)) => {
            flash::error(&session, "Please use a different username or email address.").await?;
            Ok(Redirect::to("/register"))
        }
        Err(e) => Err(e),
    }
}
