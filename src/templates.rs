// src/templates.rs
use crate::{
    error::AppResult,
    models::{
        assignment::{Assignment, Submission},
        file::StoredFile,
        post::Post,
        user::{Role, User},
    },
    web::flash::Flash,
};
use askama::Template;
use axum::response::Html;

/// Renders a page, turning template failures into `AppError`.
pub fn render<T: Template>(template: T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}

/// Navigation bar state plus the flashed messages, shared by every page.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub username: Option<String>,
    pub is_verified: bool,
    pub is_staff: bool,
    pub is_admin: bool,
    pub flashes: Vec<Flash>,
}

impl Nav {
    pub fn new(user: Option<&User>, flashes: Vec<Flash>) -> Self {
        match user {
            Some(u) => Nav {
                username: Some(u.username.clone()),
                is_verified: u.is_verified(),
                is_staff: u.is_staff(),
                is_admin: u.is_admin(),
                flashes,
            },
            None => Nav {
                flashes,
                ..Nav::default()
            },
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub nav: Nav,
    pub next: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub nav: Nav,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub nav: Nav,
    pub username: String,
    pub role_name: &'static str,
    pub is_verified: bool,
    pub recent_posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardPage {
    pub nav: Nav,
    pub posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "adminboard.html")]
pub struct AdminBoardPage {
    pub nav: Nav,
    pub posts: Vec<Post>,
    pub users: Vec<User>,
}

/// Choices for the role select box.
pub struct RoleOption {
    pub id: i64,
    pub name: &'static str,
    pub selected: bool,
}

impl RoleOption {
    pub fn all(current: Role) -> Vec<RoleOption> {
        Role::ALL
            .iter()
            .map(|r| RoleOption {
                id: r.id(),
                name: r.name(),
                selected: *r == current,
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "user.html")]
pub struct UserPage {
    pub nav: Nav,
    pub profile: User,
    pub avatar: String,
    pub posts: Vec<Post>,
    pub can_set_role: bool,
    pub role_options: Vec<RoleOption>,
}

pub struct FileRow {
    pub file: StoredFile,
    pub can_delete: bool,
}

#[derive(Template)]
#[template(path = "list.html")]
pub struct FileListPage {
    pub nav: Nav,
    pub files: Vec<FileRow>,
}

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadPage {
    pub nav: Nav,
    pub allowed_extensions: String,
}

pub struct AssignmentRow {
    pub assignment: Assignment,
    pub overdue: bool,
}

#[derive(Template)]
#[template(path = "assignments.html")]
pub struct AssignmentsPage {
    pub nav: Nav,
    pub assignments: Vec<AssignmentRow>,
    pub can_create: bool,
}

#[derive(Template)]
#[template(path = "create_assignment.html")]
pub struct CreateAssignmentPage {
    pub nav: Nav,
}

#[derive(Template)]
#[template(path = "assignment_details.html")]
pub struct AssignmentDetailsPage {
    pub nav: Nav,
    pub assignment: Assignment,
    pub overdue: bool,
    // Author or admin: every submission with a grading form
    pub can_grade: bool,
    pub submissions: Vec<Submission>,
    // Student view
    pub own_submission: Option<Submission>,
    pub can_submit: bool,
    pub allowed_extensions: String,
}
