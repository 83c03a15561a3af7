use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Role;
use super::validation::{is_acceptable_password, ValidationErrors};

/// Public view of an account, joined with its role name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login lookup row; never serialized to clients
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Generated and mailed when omitted
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &self.name, 120);
        errors.require_text("email", &self.email, 254);
        errors.email("email", Some(&self.email));
        if let Some(password) = &self.password {
            if !is_acceptable_password(password) {
                errors.add("password", "Password must have at least 8 characters, a letter and a digit");
            }
        }
        errors.into_result()
    }
}

impl UpdateUser {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.optional_text("name", self.name.as_deref(), 120);
        errors.email("email", self.email.as_deref());
        errors.into_result()
    }
}

impl ChangePassword {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.current_password.is_empty() {
            errors.add("current_password", "This field is required");
        }
        if !is_acceptable_password(&self.new_password) {
            errors.add("new_password", "Password must have at least 8 characters, a letter and a digit");
        } else if self.new_password == self.current_password {
            errors.add("new_password", "New password must differ from the current one");
        }
        errors.into_result()
    }
}
