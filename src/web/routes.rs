// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, assignment_handlers, auth_handlers, board_handlers, file_handlers, mw_auth, mw_role,
        user_handlers,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::Key, Expiry, SessionManagerLayer, SessionStore};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public routes ---
    let public_routes = Router::new()
        .route("/login", get(auth_handlers::show_login_form).post(auth_handlers::handle_login))
        .route("/logout", get(auth_handlers::handle_logout))
        .route(
            "/register",
            get(auth_handlers::show_register_form).post(auth_handlers::handle_register),
        );

    // --- Verified users (any role but unverified) ---
    let verified_routes = Router::new()
        .route("/list", get(file_handlers::list_files))
        .route(
            "/upload",
            get(file_handlers::show_upload_form).post(file_handlers::handle_upload),
        )
        .route("/files/{id}/delete", post(file_handlers::handle_delete_file))
        .route("/assignments", get(assignment_handlers::list_assignments))
        .route(
            "/detailsAssignment/{id}",
            get(assignment_handlers::assignment_details).post(assignment_handlers::handle_submit),
        )
        .route("/submissions/{id}/marks", post(assignment_handlers::handle_marks))
        .route_layer(middleware::from_fn(mw_role::require_verified));

    // --- Lecturers and admins ---
    let staff_routes = Router::new()
        .route(
            "/createAssignment",
            get(assignment_handlers::show_create_form).post(assignment_handlers::handle_create),
        )
        .route_layer(middleware::from_fn(mw_role::require_staff));

    // --- Admins ---
    let admin_routes = Router::new()
        .route(
            "/adminboard",
            get(admin_handlers::adminboard_page).post(admin_handlers::handle_delete_post),
        )
        .route_layer(middleware::from_fn(mw_role::require_admin));

    // --- Authenticated routes ---
    // require_auth wraps everything below, so the role gates always see a CurrentUser
    let authenticated_routes = Router::new()
        .route("/", get(board_handlers::index_page))
        .route("/index", get(board_handlers::index_page))
        .route(
            "/board",
            get(board_handlers::board_page).post(board_handlers::handle_new_post),
        )
        .route(
            "/user/{username}",
            get(user_handlers::user_page).post(user_handlers::handle_set_role),
        )
        // Visibility is checked per file
        .route("/uploads/{filename}", get(file_handlers::serve_upload))
        .merge(verified_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    let max_upload_bytes = app_state.config.max_upload_bytes;
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(app_state)
}

/// The full application: routes plus tracing and signed cookie sessions.
pub fn create_app<S>(app_state: AppState, session_store: S, key: Key) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_signed(key);

    create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    )
}
