// src/forms.rs
//! Incoming form payloads and their field validators.
//!
//! Every form has a `validate` method returning the list of user-facing
//! messages; an empty list means the form is acceptable. Forms whose checks
//! need the database take the pool and are async.
use crate::{
    error::AppResult,
    models::{post::POST_BODY_MAX, user::Role},
    services::{file_service, post_service, user_service},
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sqlx::SqlitePool;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub const TITLE_MAX: usize = 140;
pub const ASSIGNMENT_DESCRIPTION_MAX: usize = 255;
pub const MARKS_LIMIT: f64 = 1000.0;

// --- Field validators ---

pub fn required(value: &str, label: &str) -> Option<String> {
    value
        .trim()
        .is_empty()
        .then(|| format!("{label} is required."))
}

pub fn max_len(value: &str, max: usize, label: &str) -> Option<String> {
    (value.chars().count() > max).then(|| format!("{label} must be at most {max} characters."))
}

/// Usernames end up in `/user/<name>` paths. Blank input is left to `required`.
pub fn username(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty() && !USERNAME_RE.is_match(value))
        .then(|| "Username must contain only letters, numbers, underscores or hyphens.".to_string())
}

pub fn email(value: &str) -> Option<String> {
    (!EMAIL_RE.is_match(value.trim())).then(|| "Invalid email address.".to_string())
}

pub fn equal_to(value: &str, other: &str, message: &str) -> Option<String> {
    (value != other).then(|| message.to_string())
}

pub fn number_in_range(raw: &str, min: f64, max: f64, label: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{label} must be a number."))?;
    if !value.is_finite() || value < min || value > max {
        return Err(format!("{label} must be between {min} and {max}."));
    }
    Ok(value)
}

pub fn role_id(raw: &str) -> Result<Role, String> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(Role::from_id)
        .ok_or_else(|| "Invalid Role ID".to_string())
}

pub fn date(raw: &str, label: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{label} must be a date (YYYY-MM-DD)."))
}

// --- Forms ---

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    // HTML checkboxes are only sent when ticked
    #[serde(default)]
    pub remember_me: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Vec<String> {
        [required(&self.username, "Username"), required(&self.password, "Password")]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn remember(&self) -> bool {
        self.remember_me.is_some()
    }

    /// The page to return to after login; only local paths are honoured.
    pub fn safe_next(&self) -> Option<&str> {
        self.next
            .as_deref()
            .filter(|n| n.starts_with('/') && !n.starts_with("//"))
            // Browsers drop tabs and newlines, so "/\t/host" would become "//host"
            .filter(|n| !n.chars().any(|c| c == '\\' || c.is_control() || c.is_whitespace()))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RegistrationForm {
    pub async fn validate(&self, db_pool: &SqlitePool) -> AppResult<Vec<String>> {
        let mut errors: Vec<String> = [
            required(&self.username, "Username"),
            max_len(&self.username, 64, "Username"),
            username(&self.username),
            required(&self.email, "Email"),
            max_len(&self.email, 120, "Email"),
            email(&self.email),
            required(&self.password, "Password"),
            required(&self.password2, "Repeat Password"),
            equal_to(&self.password2, &self.password, "Passwords must match."),
        ]
        .into_iter()
        .flatten()
        .collect();

        if user_service::username_taken(db_pool, self.username.trim()).await? {
            errors.push("Please use a different username.".to_string());
        }
        if user_service::email_taken(db_pool, self.email.trim()).await? {
            errors.push("Please use a different email address.".to_string());
        }
        Ok(errors)
    }
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub body: String,
}

impl PostForm {
    pub fn validate(&self) -> Vec<String> {
        [required(&self.body, "Post body"), max_len(self.body.trim(), POST_BODY_MAX, "Post body")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

impl RoleForm {
    pub fn validate(&self) -> Result<Role, Vec<String>> {
        if let Some(e) = required(&self.role, "New Role ID") {
            return Err(vec![e]);
        }
        role_id(&self.role).map_err(|e| vec![e])
    }
}

#[derive(Debug, Deserialize)]
pub struct DeletePostForm {
    pub post_id: String,
}

impl DeletePostForm {
    /// Resolves to the id of an existing post.
    pub async fn validate(&self, db_pool: &SqlitePool) -> AppResult<Result<i64, Vec<String>>> {
        if let Some(e) = required(&self.post_id, "Post ID") {
            return Ok(Err(vec![e]));
        }
        let invalid = || Err(vec!["Please enter a valid post id.".to_string()]);
        let Ok(id) = self.post_id.trim().parse::<i64>() else {
            return Ok(invalid());
        };
        match post_service::find_post(db_pool, id).await? {
            Some(_) => Ok(Ok(id)),
            None => Ok(invalid()),
        }
    }
}

/// A file upload read from a multipart body. Also used for assignment
/// submissions, which carry the same fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl UploadForm {
    pub fn validate(&self, allowed_extensions: &[String]) -> Vec<String> {
        let mut errors: Vec<String> = [
            required(&self.title, "Title"),
            max_len(self.title.trim(), TITLE_MAX, "Title"),
            max_len(self.description.trim(), TITLE_MAX, "Description"),
        ]
        .into_iter()
        .flatten()
        .collect();

        let valid_file = self
            .filename
            .as_deref()
            .is_some_and(|name| file_service::allowed_file(name, allowed_extensions));
        if !valid_file {
            errors.push("Please enter a valid file type".to_string());
        }
        errors
    }

    pub fn description(&self) -> Option<&str> {
        Some(self.description.trim()).filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignmentForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub marks: String,
}

/// A validated assignment, ready to insert.
#[derive(Debug, PartialEq)]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub total_marks: f64,
}

impl AssignmentForm {
    pub fn validate(&self) -> Result<NewAssignment, Vec<String>> {
        let mut errors: Vec<String> = [
            required(&self.title, "Assignment Title"),
            max_len(self.title.trim(), TITLE_MAX, "Assignment Title"),
            required(&self.description, "Assignment Description"),
            max_len(self.description.trim(), ASSIGNMENT_DESCRIPTION_MAX, "Assignment Description"),
        ]
        .into_iter()
        .flatten()
        .collect();

        let due_date = date(&self.due_date, "Date due").map_err(|e| errors.push(e)).ok();
        let total_marks = number_in_range(&self.marks, 0.0, MARKS_LIMIT, "Marks")
            .map_err(|e| errors.push(e))
            .ok();

        match (due_date, total_marks) {
            (Some(due_date), Some(total_marks)) if errors.is_empty() => Ok(NewAssignment {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                due_date,
                total_marks,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarksForm {
    pub marks: String,
}

impl MarksForm {
    pub fn validate(&self, total_marks: f64) -> Result<f64, Vec<String>> {
        if let Some(e) = required(&self.marks, "Marks") {
            return Err(vec![e]);
        }
        number_in_range(&self.marks, 0.0, total_marks, "Marks").map_err(|e| vec![e])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::default_extensions, db::test_pool};

    #[test]
    fn field_validators() {
        assert!(required("  ", "Username").is_some());
        assert!(required("x", "Username").is_none());
        assert!(max_len(&"a".repeat(141), 140, "Body").is_some());
        assert!(max_len(&"ş".repeat(140), 140, "Body").is_none());
        assert!(username("susan_b-2").is_none());
        assert!(username("   ").is_none());
        assert!(username("a/b").is_some());
        assert!(username("amy smith").is_some());
        assert!(username("amy?x=1").is_some());
        assert!(email("susan@example.com").is_none());
        assert!(email("susan@").is_some());
        assert!(email("not an email").is_some());
        assert!(equal_to("a", "b", "Passwords must match.").is_some());
        assert_eq!(number_in_range("12.5", 0.0, 20.0, "Marks"), Ok(12.5));
        assert!(number_in_range("21", 0.0, 20.0, "Marks").is_err());
        assert!(number_in_range("-1", 0.0, 20.0, "Marks").is_err());
        assert!(number_in_range("NaN", 0.0, 20.0, "Marks").is_err());
        assert!(number_in_range("ten", 0.0, 20.0, "Marks").is_err());
    }

    #[test]
    fn role_form_accepts_known_roles_only() {
        for (raw, role) in [("-1", Role::Unverified), ("0", Role::Admin), ("1", Role::Lecturer), (" 2 ", Role::Student)] {
            assert_eq!(RoleForm { role: raw.into() }.validate(), Ok(role));
        }
        for raw in ["3", "-2", "admin", ""] {
            assert!(RoleForm { role: raw.into() }.validate().is_err(), "{raw} accepted");
        }
    }

    #[test]
    fn login_next_must_be_local() {
        let form = |next: &str| LoginForm {
            username: "u".into(),
            password: "p".into(),
            remember_me: Some("y".into()),
            next: Some(next.into()),
        };
        assert_eq!(form("/board").safe_next(), Some("/board"));
        assert_eq!(form("//evil.example").safe_next(), None);
        assert_eq!(form("https://evil.example").safe_next(), None);
        assert_eq!(form("/\t/evil.example").safe_next(), None);
        assert_eq!(form("/\r\n/evil.example").safe_next(), None);
        assert_eq!(form("/ /evil.example").safe_next(), None);
        assert_eq!(form("/\\evil.example").safe_next(), None);
        assert_eq!(form("/user/amy?tab=posts").safe_next(), Some("/user/amy?tab=posts"));
        assert!(form("/board").remember());
    }

    #[test]
    fn post_body_limits() {
        assert!(PostForm { body: "hello".into() }.validate().is_empty());
        assert_eq!(PostForm { body: " ".into() }.validate(), vec!["Post body is required."]);
        assert_eq!(PostForm { body: "x".repeat(141) }.validate().len(), 1);
    }

    #[test]
    fn upload_requires_title_and_whitelisted_file() {
        let allowed = default_extensions();
        let mut form = UploadForm {
            title: "Cat".into(),
            description: "  ".into(),
            filename: Some("cat.JPEG".into()),
            data: b"x".to_vec(),
        };
        assert!(form.validate(&allowed).is_empty());
        assert_eq!(form.description(), None);

        form.filename = Some("script.sh".into());
        assert_eq!(form.validate(&allowed), vec!["Please enter a valid file type"]);

        form.filename = None;
        form.title.clear();
        assert_eq!(form.validate(&allowed).len(), 2);
    }

    #[test]
    fn assignment_form_parses_date_and_marks() {
        let form = AssignmentForm {
            title: " Essay ".into(),
            description: "Write one".into(),
            due_date: "2030-05-01".into(),
            marks: "20".into(),
        };
        let parsed = form.validate().unwrap();
        assert_eq!(parsed.title, "Essay");
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2030, 5, 1).unwrap());
        assert_eq!(parsed.total_marks, 20.0);

        let bad = AssignmentForm {
            title: "".into(),
            description: "".into(),
            due_date: "01/05/2030".into(),
            marks: "lots".into(),
        };
        assert_eq!(bad.validate().unwrap_err().len(), 4);
    }

    #[test]
    fn marks_are_bounded_by_total() {
        let form = |m: &str| MarksForm { marks: m.into() };
        assert_eq!(form("15").validate(20.0), Ok(15.0));
        assert_eq!(form("0").validate(20.0), Ok(0.0));
        assert!(form("20.5").validate(20.0).is_err());
        assert!(form("").validate(20.0).is_err());
    }

    #[tokio::test]
    async fn registration_rejects_duplicates() {
        let pool = test_pool().await;
        user_service::create_user(&pool, "john", "john@example.com", "pw", Role::Student)
            .await
            .unwrap();

        let form = RegistrationForm {
            username: "john".into(),
            email: "john@example.com".into(),
            password: "pw".into(),
            password2: "pw".into(),
        };
        let errors = form.validate(&pool).await.unwrap();
        assert!(errors.contains(&"Please use a different username.".to_string()));
        assert!(errors.contains(&"Please use a different email address.".to_string()));

        let fresh = RegistrationForm {
            username: "susan".into(),
            email: "susan@example.com".into(),
            password: "pw".into(),
            password2: "other".into(),
        };
        assert_eq!(fresh.validate(&pool).await.unwrap(), vec!["Passwords must match."]);
    }

    #[tokio::test]
    async fn delete_post_form_requires_existing_post() {
        let pool = test_pool().await;
        let uid = user_service::create_user(&pool, "john", "john@example.com", "pw", Role::Student)
            .await
            .unwrap();
        let pid = post_service::create_post(&pool, uid, "hello").await.unwrap();

        let ok = DeletePostForm { post_id: pid.to_string() };
        assert_eq!(ok.validate(&pool).await.unwrap(), Ok(pid));
        let missing = DeletePostForm { post_id: (pid + 1).to_string() };
        assert!(missing.validate(&pool).await.unwrap().is_err());
        let junk = DeletePostForm { post_id: "abc".into() };
        assert!(junk.validate(&pool).await.unwrap().is_err());
    }
}
