// src/web/board_handlers.rs
use crate::{
    error::AppResult,
    forms::PostForm,
    services::post_service,
    state::AppState,
    templates::{render, BoardPage, IndexPage},
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

const RECENT_POSTS: usize = 5;

// GET /index
pub async fn index_page(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let mut recent_posts = post_service::list_posts(&state.db_pool).await?;
    recent_posts.truncate(RECENT_POSTS);

    let page = IndexPage {
        nav: page_nav(&session, Some(&user)).await?,
        username: user.username.clone(),
        role_name: user.role_name(),
        is_verified: user.is_verified(),
        recent_posts,
    };
    render(page)
}

// GET /board
pub async fn board_page(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let posts = post_service::list_posts(&state.db_pool).await?;
    tracing::debug!("GET /board: {} posts for {}", posts.len(), user.username);
    let page = BoardPage {
        nav: page_nav(&session, Some(&user)).await?,
        posts,
    };
    render(page)
}

// POST /board
pub async fn handle_new_post(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<PostForm>,
) -> AppResult<Redirect> {
    let errors = form.validate();
    if !errors.is_empty() {
        flash::errors(&session, &errors).await?;
        return Ok(Redirect::to("/board"));
    }

    post_service::create_post(&state.db_pool, user.id, form.body.trim()).await?;
    flash::info(&session, "Your post is now live!").await?;
    Ok(Redirect::to("/board"))
}
