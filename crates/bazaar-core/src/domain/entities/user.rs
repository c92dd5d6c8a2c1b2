//! User entity.

use crate::domain::value_objects::{Email, UserRole, UserStatus};
use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A marketplace account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,

    /// Argon2 PHC string, never exposed via API.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub display_name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates an active customer account.
    #[must_use]
    pub fn new(username: String, email: Email, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username,
            email,
            password_hash,
            display_name: None,
            role: UserRole::Customer,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn can_login(&self) -> bool {
        self.status.can_login()
    }

    #[must_use]
    pub const fn has_role(&self, required: UserRole) -> bool {
        self.role.has_permission(required)
    }

    pub fn update_profile(&mut self, display_name: Option<String>, email: Option<Email>) {
        if display_name.is_some() {
            self.display_name = display_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        self.updated_at = Utc::now();
    }

    pub fn change_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn change_status(&mut self, status: UserStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            "jane".to_string(),
            Email::new("jane@example.com").unwrap(),
            "hash".to_string(),
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let u = user();
        assert_eq!(u.role, UserRole::Customer);
        assert!(u.can_login());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_string(&user()).unwrap();
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_update_profile_keeps_missing_fields() {
        let mut u = user();
        u.update_profile(Some("Jane D".to_string()), None);
        assert_eq!(u.display_name.as_deref(), Some("Jane D"));
        assert_eq!(u.email.as_str(), "jane@example.com");
    }

    #[test]
    fn test_suspended_user_cannot_login() {
        let mut u = user();
        u.change_status(UserStatus::Suspended);
        assert!(!u.can_login());
    }
}
