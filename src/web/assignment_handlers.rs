// src/web/assignment_handlers.rs
use crate::{
    error::AppResult,
    forms::{AssignmentForm, MarksForm},
    models::{file::NewFile, user::Role},
    services::{assignment_service, file_service},
    state::AppState,
    templates::{render, AssignmentDetailsPage, AssignmentRow, AssignmentsPage, CreateAssignmentPage},
    web::{
        file_handlers::read_upload_form,
        flash::{self, page_nav},
        mw_auth::CurrentUser,
    },
};
use axum::{
    extract::{Extension, Form, Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

fn details_url(assignment_id: i64) -> String {
    format!("/detailsAssignment/{assignment_id}")
}

// GET /assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let today = Utc::now().date_naive();
    let assignments = assignment_service::list_assignments(&state.db_pool)
        .await?
        .into_iter()
        .map(|assignment| AssignmentRow {
            overdue: assignment.is_overdue(today),
            assignment,
        })
        .collect();

    let page = AssignmentsPage {
        nav: page_nav(&session, Some(&user)).await?,
        assignments,
        can_create: user.is_staff(),
    };
    render(page)
}

// GET /createAssignment
pub async fn show_create_form(
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let page = CreateAssignmentPage {
        nav: page_nav(&session, Some(&user)).await?,
    };
    render(page)
}

// POST /createAssignment
pub async fn handle_create(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<AssignmentForm>,
) -> AppResult<Redirect> {
    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            flash::errors(&session, &errors).await?;
            return Ok(Redirect::to("/createAssignment"));
        }
    };

    let id = assignment_service::create_assignment(
        &state.db_pool,
        user.id,
        &new.title,
        &new.description,
        new.due_date,
        new.total_marks,
    )
    .await?;
    flash::info(&session, format!("Assignment '{}' created.", new.title)).await?;
    Ok(Redirect::to(&details_url(id)))
}

// GET /detailsAssignment/{id}
pub async fn assignment_details(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(assignment_id): Path<i64>,
) -> AppResult<Response> {
    let Some(assignment) = assignment_service::find_assignment(&state.db_pool, assignment_id).await? else {
        flash::error(&session, "Assignment not found.").await?;
        return Ok(Redirect::to("/assignments").into_response());
    };

    let can_grade = user.is_admin() || assignment.user_id == user.id;
    let submissions = if can_grade {
        assignment_service::list_submissions(&state.db_pool, assignment.id).await?
    } else {
        Vec::new()
    };
    let own_submission =
        assignment_service::find_user_submission(&state.db_pool, assignment.id, user.id).await?;

    let overdue = assignment.is_overdue(Utc::now().date_naive());
    let page = AssignmentDetailsPage {
        nav: page_nav(&session, Some(&user)).await?,
        overdue,
        can_grade,
        submissions,
        can_submit: user.role() == Role::Student && own_submission.is_none() && !overdue,
        own_submission,
        allowed_extensions: state.config.allowed_extensions.join(", "),
        assignment,
    };
    Ok(render(page)?.into_response())
}

// POST /detailsAssignment/{id}: a student hands in a file
pub async fn handle_submit(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(assignment_id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let Some(assignment) = assignment_service::find_assignment(&state.db_pool, assignment_id).await? else {
        flash::error(&session, "Assignment not found.").await?;
        return Ok(Redirect::to("/assignments"));
    };
    let back = Redirect::to(&details_url(assignment.id));

    if user.role() != Role::Student {
        flash::error(&session, "Only students can submit assignments.").await?;
        return Ok(back);
    }
    if assignment.is_overdue(Utc::now().date_naive()) {
        flash::error(&session, "This assignment is closed.").await?;
        return Ok(back);
    }
    if assignment_service::find_user_submission(&state.db_pool, assignment.id, user.id)
        .await?
        .is_some()
    {
        flash::error(&session, "You have already submitted this assignment.").await?;
        return Ok(back);
    }

    let form = read_upload_form(multipart).await?;
    let errors = form.validate(&state.config.allowed_extensions);
    if !errors.is_empty() {
        flash::errors(&session, &errors).await?;
        return Ok(back);
    }

    let original = form.filename.as_deref().unwrap_or_default();
    let filename = file_service::unique_filename(original);
    let path = file_service::save_to_disk(&state.config.upload_dir, &filename, &form.data).await?;
    let path = path.to_string_lossy();

    let title = form.title.trim();
    let new_file = NewFile {
        filename: &filename,
        path: &path,
        title,
        description: form.description(),
        user_id: user.id,
    };
    let result = assignment_service::create_submission(
        &state.db_pool,
        assignment.id,
        &new_file,
        title,
        form.description().unwrap_or_default(),
    )
    .await;
    if let Err(e) = result {
        file_service::remove_from_disk(&path).await;
        return Err(e);
    }

    flash::info(&session, "Your submission has been received.").await?;
    Ok(back)
}

// POST /submissions/{id}/marks
pub async fn handle_marks(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(submission_id): Path<i64>,
    Form(form): Form<MarksForm>,
) -> AppResult<Redirect> {
    let submission = assignment_service::find_submission(&state.db_pool, submission_id).await?;
    let assignment = match &submission {
        Some(s) => assignment_service::find_assignment(&state.db_pool, s.assignment_id).await?,
        None => None,
    };
    let (Some(submission), Some(assignment)) = (submission, assignment) else {
        flash::error(&session, "Submission not found.").await?;
        return Ok(Redirect::to("/assignments"));
    };
    let back = Redirect::to(&details_url(assignment.id));

    if !(user.is_admin() || assignment.user_id == user.id) {
        tracing::warn!("'{}' tried to grade submission {}", user.username, submission.id);
        flash::error(&session, "Only the assignment's author can grade it.").await?;
        return Ok(back);
    }

    let marks = match form.validate(assignment.total_marks) {
        Ok(marks) => marks,
        Err(errors) => {
            flash::errors(&session, &errors).await?;
            return Ok(back);
        }
    };

    assignment_service::set_marks(&state.db_pool, submission.id, marks).await?;
    flash::info(
        &session,
        format!("Marked {}'s submission: {} / {}", submission.submitter, marks, assignment.total_marks),
    )
    .await?;
    Ok(back)
}
