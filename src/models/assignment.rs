// src/models/assignment.rs
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub total_marks: f64,
    pub user_id: i64,
    pub author: String,
}

impl Assignment {
    pub fn formatted_due_date(&self) -> String {
        self.due_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "No due date".to_string())
    }

    pub fn formatted_set_on(&self) -> String {
        self.timestamp.format("%d/%m/%Y").to_string()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|d| d < today)
    }
}

/// A submission joined with the submitter and the handed-in file.
#[derive(Debug, Clone, FromRow)]
pub struct Submission {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub assignment_id: i64,
    pub marks: Option<f64>,
    pub submitter: String,
    pub filename: String,
}

impl Submission {
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M %d/%m/%y").to_string()
    }

    pub fn marks_display(&self) -> String {
        match self.marks {
            Some(m) => format!("{m}"),
            None => "Not graded".to_string(),
        }
    }
}
