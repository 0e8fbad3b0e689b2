// src/services/assignment_service.rs
use crate::{
    error::AppResult,
    models::{
        assignment::{Assignment, Submission},
        file::NewFile,
    },
    services::file_service,
};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

const ASSIGNMENT_SELECT: &str = r#"
    SELECT a.id, a.title, a.description, a.timestamp, a.due_date,
           COALESCE(a.total_marks, 0.0) AS total_marks, a.user_id, u.username AS author
    FROM assignments a
    JOIN users u ON u.id = a.user_id
"#;

const SUBMISSION_SELECT: &str = r#"
    SELECT s.id, s.title, s.description, s.timestamp, s.assignment_id, s.marks,
           u.username AS submitter, f.filename
    FROM submissions s
    JOIN users u ON u.id = s.user_id
    JOIN files f ON f.id = s.file_id
"#;

pub async fn create_assignment(
    db_pool: &SqlitePool,
    author_id: i64,
    title: &str,
    description: &str,
    due_date: NaiveDate,
    total_marks: f64,
) -> AppResult<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO assignments (title, description, timestamp, due_date, total_marks, user_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(Utc::now())
    .bind(due_date)
    .bind(total_marks)
    .bind(author_id)
    .execute(db_pool)
    .await?
    .last_insert_rowid();
    tracing::info!("Assignment {} ('{}') created by user {}", id, title, author_id);
    Ok(id)
}

/// Soonest due first; assignments without a due date go last.
pub async fn list_assignments(db_pool: &SqlitePool) -> AppResult<Vec<Assignment>> {
    let assignments = sqlx::query_as::<_, Assignment>(&format!(
        "{ASSIGNMENT_SELECT} ORDER BY a.due_date IS NULL, a.due_date ASC, a.id ASC"
    ))
    .fetch_all(db_pool)
    .await?;
    Ok(assignments)
}

pub async fn find_assignment(db_pool: &SqlitePool, assignment_id: i64) -> AppResult<Option<Assignment>> {
    let assignment = sqlx::query_as::<_, Assignment>(&format!("{ASSIGNMENT_SELECT} WHERE a.id = ?1"))
        .bind(assignment_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(assignment)
}

/// Stores the uploaded file row and its submission atomically.
pub async fn create_submission(
    db_pool: &SqlitePool,
    assignment_id: i64,
    file: &NewFile<'_>,
    title: &str,
    description: &str,
) -> AppResult<i64> {
    let mut tx = db_pool.begin().await?;

    let file_id = file_service::insert_file(&mut *tx, file).await?;
    let submission_id = sqlx::query(
        r#"
        INSERT INTO submissions (title, description, timestamp, user_id, file_id, assignment_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(Utc::now())
    .bind(file.user_id)
    .bind(file_id)
    .bind(assignment_id)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;
    tracing::info!(
        "✅ Submission {} for assignment {} by user {}",
        submission_id,
        assignment_id,
        file.user_id
    );
    Ok(submission_id)
}

pub async fn list_submissions(db_pool: &SqlitePool, assignment_id: i64) -> AppResult<Vec<Submission>> {
    let submissions = sqlx::query_as::<_, Submission>(&format!(
        "{SUBMISSION_SELECT} WHERE s.assignment_id = ?1 ORDER BY s.timestamp ASC, s.id ASC"
    ))
    .bind(assignment_id)
    .fetch_all(db_pool)
    .await?;
    Ok(submissions)
}

pub async fn find_user_submission(
    db_pool: &SqlitePool,
    assignment_id: i64,
    user_id: i64,
) -> AppResult<Option<Submission>> {
    let submission = sqlx::query_as::<_, Submission>(&format!(
        "{SUBMISSION_SELECT} WHERE s.assignment_id = ?1 AND s.user_id = ?2"
    ))
    .bind(assignment_id)
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(submission)
}

pub async fn find_submission(db_pool: &SqlitePool, submission_id: i64) -> AppResult<Option<Submission>> {
    let submission = sqlx::query_as::<_, Submission>(&format!("{SUBMISSION_SELECT} WHERE s.id = ?1"))
        .bind(submission_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(submission)
}

pub async fn set_marks(db_pool: &SqlitePool, submission_id: i64, marks: f64) -> AppResult<bool> {
    let rows = sqlx::query("UPDATE submissions SET marks = ?1 WHERE id = ?2")
        .bind(marks)
        .bind(submission_id)
        .execute(db_pool)
        .await?
        .rows_affected();
    tracing::info!("Submission {} graded with {}", submission_id, marks);
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::test_pool,
        models::user::Role,
        services::{file_service, user_service},
    };

    async fn seed(pool: &SqlitePool) -> (i64, i64, i64) {
        let lecturer = user_service::create_user(pool, "prof", "prof@example.com", "pw", Role::Lecturer)
            .await
            .unwrap();
        let student = user_service::create_user(pool, "amy", "amy@example.com", "pw", Role::Student)
            .await
            .unwrap();
        let due = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();
        let assignment = create_assignment(pool, lecturer, "Essay", "Write one", due, 20.0)
            .await
            .unwrap();
        (lecturer, student, assignment)
    }

    #[tokio::test]
    async fn assignments_are_listed_by_due_date() {
        let pool = test_pool().await;
        let (lecturer, _, essay) = seed(&pool).await;
        let sooner = create_assignment(
            &pool,
            lecturer,
            "Quiz",
            "Short",
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            5.0,
        )
        .await
        .unwrap();

        let ids: Vec<i64> = list_assignments(&pool).await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![sooner, essay]);

        let essay = find_assignment(&pool, essay).await.unwrap().unwrap();
        assert_eq!(essay.author, "prof");
        assert_eq!(essay.total_marks, 20.0);
        assert_eq!(essay.formatted_due_date(), "01/05/2030");
    }

    #[tokio::test]
    async fn submission_links_file_and_assignment() {
        let pool = test_pool().await;
        let (_, student, assignment) = seed(&pool).await;

        let file = NewFile {
            filename: "abc_essay.png",
            path: "uploads/abc_essay.png",
            title: "My essay",
            description: None,
            user_id: student,
        };
        let id = create_submission(&pool, assignment, &file, "My essay", "")
            .await
            .unwrap();

        let submission = find_user_submission(&pool, assignment, student)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.id, id);
        assert_eq!(submission.filename, "abc_essay.png");
        assert_eq!(submission.marks, None);
        assert_eq!(submission.marks_display(), "Not graded");

        // Submission files drop out of the shared list
        assert!(file_service::list_shared_files(&pool).await.unwrap().is_empty());
        let stored = file_service::find_file_by_name(&pool, "abc_essay.png")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.submission_id, Some(id));

        assert!(set_marks(&pool, id, 17.5).await.unwrap());
        let graded = find_submission(&pool, id).await.unwrap().unwrap();
        assert_eq!(graded.marks, Some(17.5));
        assert_eq!(list_submissions(&pool, assignment).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_submission_leaves_no_file_row() {
        let pool = test_pool().await;
        let (_, student, _) = seed(&pool).await;
        let file = NewFile {
            filename: "orphan.png",
            path: "uploads/orphan.png",
            title: "x",
            description: None,
            user_id: student,
        };
        // Unknown assignment violates the foreign key, rolling back the file insert
        assert!(create_submission(&pool, 999, &file, "x", "").await.is_err());
        assert!(file_service::find_file_by_name(&pool, "orphan.png")
            .await
            .unwrap()
            .is_none());
    }
}
