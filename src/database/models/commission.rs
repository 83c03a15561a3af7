use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::{normalize_optional, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Commission {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommissionInput {
    pub name: String,
    pub description: Option<String>,
}

impl CommissionInput {
    /// Blank optional fields become NULL
    pub fn normalize(mut self) -> Self {
        self.description = normalize_optional(self.description);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &self.name, 120);
        errors.optional_text("description", self.description.as_deref(), 1000);
        errors.into_result()
    }
}
