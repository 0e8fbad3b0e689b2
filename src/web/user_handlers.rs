// src/web/user_handlers.rs
use crate::{
    error::AppResult,
    forms::RoleForm,
    services::{post_service, user_service},
    state::AppState,
    templates::{render, RoleOption, UserPage},
    web::{
        flash::{self, page_nav},
        mw_auth::CurrentUser,
    },
};
use axum::{
    extract::{Extension, Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

const AVATAR_SIZE: u32 = 128;

// GET /user/{username}
pub async fn user_page(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let Some(profile) = user_service::find_user_by_username(&state.db_pool, &username).await? else {
        tracing::debug!("GET /user/{}: no such user", username);
        flash::error(&session, format!("User {username} not found.")).await?;
        return Ok(Redirect::to("/index").into_response());
    };

    let posts = post_service::list_posts_by_user(&state.db_pool, profile.id).await?;
    let page = UserPage {
        nav: page_nav(&session, Some(&viewer)).await?,
        avatar: profile.avatar(AVATAR_SIZE),
        can_set_role: viewer.is_admin(),
        role_options: RoleOption::all(profile.role()),
        posts,
        profile,
    };
    Ok(render(page)?.into_response())
}

// POST /user/{username}: admins change the user's role
pub async fn handle_set_role(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    Path(username): Path<String>,
    Form(form): Form<RoleForm>,
) -> AppResult<Redirect> {
    if !viewer.is_admin() {
        tracing::warn!("'{}' tried to change the role of '{}'", viewer.username, username);
        flash::error(&session, crate::web::mw_role::DENIED_MESSAGE).await?;
        return Ok(Redirect::to("/index"));
    }

    let Some(target) = user_service::find_user_by_username(&state.db_pool, &username).await? else {
        flash::error(&session, format!("User {username} not found.")).await?;
        return Ok(Redirect::to("/index"));
    };

    let back = Redirect::to(&format!("/user/{}", urlencoding::encode(&target.username)));
    let role = match form.validate() {
        Ok(role) => role,
        Err(errors) => {
            flash::errors(&session, &errors).await?;
            return Ok(back);
        }
    };

    user_service::set_user_role(&state.db_pool, target.id, role).await?;
    tracing::info!("Admin {} set role of {} to {:?}", viewer.username, target.username, role);
    flash::info(&session, format!("{} is now: {}", target.username, role.name())).await?;
    Ok(back)
}
