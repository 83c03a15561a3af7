use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::{normalize_optional, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Institution {
    pub id: Uuid,
    pub name: String,
    pub acronym: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub place_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionInput {
    pub name: String,
    pub acronym: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub place_id: Option<Uuid>,
}

impl InstitutionInput {
    /// Blank optional fields become NULL
    pub fn normalize(mut self) -> Self {
        self.acronym = normalize_optional(self.acronym);
        self.address = normalize_optional(self.address);
        self.phone = normalize_optional(self.phone);
        self.email = normalize_optional(self.email);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &self.name, 200);
        errors.optional_text("acronym", self.acronym.as_deref(), 20);
        errors.optional_text("address", self.address.as_deref(), 200);
        errors.phone("phone", self.phone.as_deref());
        errors.email("email", self.email.as_deref());
        errors.into_result()
    }
}
