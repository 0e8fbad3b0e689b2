// src/models/user.rs
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::FromRow;

/// Authorization level stored in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Unverified,
    Admin,
    Lecturer,
    Student,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Unverified, Role::Admin, Role::Lecturer, Role::Student];

    pub fn from_id(id: i64) -> Option<Role> {
        match id {
            -1 => Some(Role::Unverified),
            0 => Some(Role::Admin),
            1 => Some(Role::Lecturer),
            2 => Some(Role::Student),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Role::Unverified => -1,
            Role::Admin => 0,
            Role::Lecturer => 1,
            Role::Student => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Unverified => "Unverified User",
            Role::Admin => "Admin",
            Role::Lecturer => "Lecturer",
            Role::Student => "Student",
        }
    }
}

// Row of the 'users' table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The role column is CHECK-constrained, so anything unknown is treated as unverified.
    pub fn role(&self) -> Role {
        Role::from_id(self.role).unwrap_or(Role::Unverified)
    }

    pub fn role_name(&self) -> &'static str {
        self.role().name()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    /// Admins and lecturers can create and grade assignments.
    pub fn is_staff(&self) -> bool {
        matches!(self.role(), Role::Admin | Role::Lecturer)
    }

    pub fn is_verified(&self) -> bool {
        self.role() != Role::Unverified
    }

    pub fn member_since(&self) -> String {
        self.created_at.format("%d/%m/%Y").to_string()
    }

    /// Gravatar identicon for the account e-mail.
    pub fn avatar(&self, size: u32) -> String {
        let digest = Sha256::digest(self.email.trim().to_lowercase().as_bytes());
        format!(
            "https://www.gravatar.com/avatar/{}?d=identicon&s={}",
            hex::encode(digest),
            size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user_with_role(role: i64) -> User {
        User {
            id: 1,
            username: "susan".into(),
            email: "Susan@Example.com".into(),
            password_hash: None,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn role_ids_map_both_ways() {
        for role in Role::ALL {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(3), None);
        assert_eq!(Role::from_id(-2), None);
    }

    #[test]
    fn role_helpers() {
        assert!(user_with_role(0).is_admin());
        assert!(user_with_role(0).is_staff());
        assert_eq!(user_with_role(1).role(), Role::Lecturer);
        assert!(user_with_role(1).is_staff());
        assert!(!user_with_role(2).is_staff());
        assert!(!user_with_role(-1).is_verified());
        assert_eq!(user_with_role(2).role_name(), "Student");
        assert_eq!(user_with_role(-1).role_name(), "Unverified User");
    }

    #[test]
    fn member_since_is_a_plain_date() {
        let mut user = user_with_role(2);
        user.created_at = Utc.with_ymd_and_hms(2024, 1, 18, 12, 0, 0).unwrap();
        assert_eq!(user.member_since(), "18/01/2024");
    }

    #[test]
    fn avatar_ignores_email_case() {
        let a = user_with_role(2);
        let mut b = user_with_role(2);
        b.email = "susan@example.com".into();
        assert_eq!(a.avatar(128), b.avatar(128));
        assert!(a.avatar(36).ends_with("?d=identicon&s=36"));
    }
}
