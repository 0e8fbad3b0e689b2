// src/web/file_handlers.rs
use crate::{
    error::{AppError, AppResult},
    forms::UploadForm,
    models::file::NewFile,
    services::file_service,
    state::AppState,
    templates::{render, FileListPage, FileRow, UploadPage},
    web::{
        flash::{self, page_nav},
        mw_auth::CurrentUser,
    },
};
use axum::{
    extract::{Extension, Multipart, Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Reads the `title`, `description` and `file` parts of an upload form.
/// Unknown parts are skipped.
pub async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = field.text().await?,
            "description" => form.description = field.text().await?,
            "file" => {
                // Browsers send an empty part when no file was picked
                let filename = field.file_name().map(str::to_string).filter(|n| !n.is_empty());
                let data = field.bytes().await?;
                if filename.is_some() {
                    form.filename = filename;
                    form.data = data.to_vec();
                }
            }
            other => tracing::debug!("Ignoring multipart field {:?}", other),
        }
    }
    Ok(form)
}

// GET /list
pub async fn list_files(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let files = file_service::list_shared_files(&state.db_pool)
        .await?
        .into_iter()
        .map(|file| FileRow {
            can_delete: file_service::can_delete(&file, &user),
            file,
        })
        .collect();

    let page = FileListPage {
        nav: page_nav(&session, Some(&user)).await?,
        files,
    };
    render(page)
}

// GET /upload
pub async fn show_upload_form(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let page = UploadPage {
        nav: page_nav(&session, Some(&user)).await?,
        allowed_extensions: state.config.allowed_extensions.join(", "),
    };
    render(page)
}

// POST /upload
pub async fn handle_upload(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let form = read_upload_form(multipart).await?;

    let errors = form.validate(&state.config.allowed_extensions);
    if !errors.is_empty() {
        tracing::warn!("Upload by {} rejected: {:?}", user.username, errors);
        flash::errors(&session, &errors).await?;
        return Ok(Redirect::to("/upload"));
    }

    let original = form.filename.as_deref().unwrap_or_default();
    let filename = file_service::unique_filename(original);
    let path = file_service::save_to_disk(&state.config.upload_dir, &filename, &form.data).await?;
    let path = path.to_string_lossy();

    let new_file = NewFile {
        filename: &filename,
        path: &path,
        title: form.title.trim(),
        description: form.description(),
        user_id: user.id,
    };
    if let Err(e) = file_service::create_file(&state.db_pool, &new_file).await {
        file_service::remove_from_disk(&path).await;
        return Err(e);
    }

    flash::info(&session, "File uploaded successfully.").await?;
    Ok(Redirect::to("/list"))
}

// POST /files/{id}/delete
pub async fn handle_delete_file(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(file_id): Path<i64>,
) -> AppResult<Redirect> {
    let Some(file) = file_service::find_file_by_id(&state.db_pool, file_id).await? else {
        flash::error(&session, "File not found.").await?;
        return Ok(Redirect::to("/list"));
    };

    if file.submission_id.is_some() {
        flash::error(&session, "This file belongs to an assignment submission and cannot be deleted.").await?;
        return Ok(Redirect::to("/list"));
    }
    if !file_service::can_delete(&file, &user) {
        tracing::warn!("'{}' tried to delete file {} of user {}", user.username, file.id, file.user_id);
        flash::error(&session, "You can only delete your own files.").await?;
        return Ok(Redirect::to("/list"));
    }

    file_service::delete_file(&state.db_pool, &file).await?;
    flash::info(&session, format!("Deleted {}.", file.display_title())).await?;
    Ok(Redirect::to("/list"))
}

// GET /uploads/{filename}
pub async fn serve_upload(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let found = file_service::find_file_by_name(&state.db_pool, &filename).await?;
    let visible = match &found {
        Some(file) => file_service::can_view(&state.db_pool, file, &user).await?,
        None => false,
    };
    let file = match found {
        Some(file) if visible => file,
        // Hidden files look exactly like missing ones
        _ => {
            tracing::debug!("GET /uploads/{}: not available to {}", filename, user.username);
            flash::error(&session, "File not found.").await?;
            return Ok(Redirect::to("/list").into_response());
        }
    };

    let data = match tokio::fs::read(&file.path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!("File {} is in the database but missing at {}", file.id, file.path);
            flash::error(&session, "File not found.").await?;
            return Ok(Redirect::to("/list").into_response());
        }
        Err(e) => return Err(AppError::IoError(e)),
    };

    let mime = mime_guess::from_path(&file.filename).first_or_octet_stream();
    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", file.filename),
            ),
        ],
        data,
    )
        .into_response())
}
