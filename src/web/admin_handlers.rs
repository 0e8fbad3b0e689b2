// src/web/admin_handlers.rs
use crate::{
    error::AppResult,
    forms::DeletePostForm,
    services::{post_service, user_service},
    state::AppState,
    templates::{render, AdminBoardPage},
    web::{
        flash::{self, page_nav},
        mw_auth::CurrentUser,
    },
};
use axum::{
    extract::{Extension, Form, State},
    response::{Html, Redirect},
};
use tower_sessions::Session;

// GET /adminboard
pub async fn adminboard_page(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    tracing::debug!("GET /adminboard by {}", admin.username);
    let posts = post_service::list_posts(&state.db_pool).await?;
    let users = user_service::find_all_users(&state.db_pool).await?;

    let page = AdminBoardPage {
        nav: page_nav(&session, Some(&admin)).await?,
        posts,
        users,
    };
    render(page)
}

// POST /adminboard
pub async fn handle_delete_post(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Form(form): Form<DeletePostForm>,
) -> AppResult<Redirect> {
    let post_id = match form.validate(&state.db_pool).await? {
        Ok(id) => id,
        Err(errors) => {
            flash::errors(&session, &errors).await?;
            return Ok(Redirect::to("/adminboard"));
        }
    };

    if post_service::delete_post(&state.db_pool, post_id).await? {
        tracing::info!("Admin {} deleted post {}", admin.username, post_id);
        flash::info(&session, format!("Post {post_id} deleted.")).await?;
    } else {
        flash::error(&session, "Please enter a valid post id.").await?;
    }
    Ok(Redirect::to("/adminboard"))
}
