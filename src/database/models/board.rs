use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::place::PlacePath;
use super::validation::{normalize_optional, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardStatus {
    Active,
    Suspended,
    Dissolved,
}

impl BoardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardStatus::Active => "active",
            BoardStatus::Suspended => "suspended",
            BoardStatus::Dissolved => "dissolved",
        }
    }

    pub fn label_es(&self) -> &'static str {
        match self {
            BoardStatus::Active => "Activa",
            BoardStatus::Suspended => "Suspendida",
            BoardStatus::Dissolved => "Disuelta",
        }
    }

    /// Dissolution is final
    pub fn can_transition_to(&self, next: BoardStatus) -> bool {
        !matches!(self, BoardStatus::Dissolved) && *self != next
    }
}

impl fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(BoardStatus::Active),
            "suspended" => Ok(BoardStatus::Suspended),
            "dissolved" => Ok(BoardStatus::Dissolved),
            other => Err(format!("unknown board status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardType {
    Communal,
    Neighborhood,
    Housing,
    Other,
}

impl BoardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardType::Communal => "communal",
            BoardType::Neighborhood => "neighborhood",
            BoardType::Housing => "housing",
            BoardType::Other => "other",
        }
    }

    pub fn label_es(&self) -> &'static str {
        match self {
            BoardType::Communal => "Junta de Acción Comunal",
            BoardType::Neighborhood => "Junta Vecinal",
            BoardType::Housing => "Junta de Vivienda Comunitaria",
            BoardType::Other => "Organización Comunitaria",
        }
    }
}

impl FromStr for BoardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "communal" => Ok(BoardType::Communal),
            "neighborhood" => Ok(BoardType::Neighborhood),
            "housing" => Ok(BoardType::Housing),
            "other" => Ok(BoardType::Other),
            other => Err(format!("unknown board type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub board_type: String,
    pub registration_number: String,
    pub resolution_number: Option<String>,
    pub registered_on: Option<NaiveDate>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub place_id: Uuid,
    pub institution_id: Option<Uuid>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn board_status(&self) -> Option<BoardStatus> {
        self.status.parse().ok()
    }

    pub fn board_type_label(&self) -> &'static str {
        self.board_type.parse::<BoardType>().map(|t| t.label_es()).unwrap_or("Organización Comunitaria")
    }
}

/// Board with its resolved place chain and institution, as shown on detail views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub place_path: PlacePath,
    pub institution_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardInput {
    pub name: String,
    pub board_type: BoardType,
    pub registration_number: String,
    pub resolution_number: Option<String>,
    pub registered_on: Option<NaiveDate>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub place_id: Uuid,
    pub institution_id: Option<Uuid>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

impl BoardInput {
    /// Blank optional fields become NULL
    pub fn normalize(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.registration_number = self.registration_number.trim().to_uppercase();
        self.resolution_number = normalize_optional(self.resolution_number);
        self.address = normalize_optional(self.address);
        self.email = normalize_optional(self.email);
        self.phone = normalize_optional(self.phone);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &self.name, 200);
        errors.require_text("registration_number", &self.registration_number, 40);
        errors.optional_text("resolution_number", self.resolution_number.as_deref(), 40);
        errors.optional_text("address", self.address.as_deref(), 200);
        errors.email("email", self.email.as_deref());
        errors.phone("phone", self.phone.as_deref());
        errors.period("period_end", self.period_start, self.period_end);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardStatusChange {
    pub status: BoardStatus,
    pub reason: Option<String>,
}

/// Body of `POST /api/boards/find`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardSearch {
    pub name: Option<String>,
    pub registration_number: Option<String>,
    pub status: Option<BoardStatus>,
    pub board_type: Option<BoardType>,
    /// Any level of the hierarchy; departments and provinces match the boards below them
    pub place_id: Option<Uuid>,
    pub institution_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl BoardSearch {
    /// Filter conditions; `place_ids` replaces `place_id` once resolved to municipalities
    pub fn where_clause(&self, place_ids: Option<&[Uuid]>) -> serde_json::Value {
        let mut conditions = serde_json::Map::new();
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            conditions.insert("name".into(), serde_json::json!({ "$ilike": format!("%{}%", escape_like(name)) }));
        }
        if let Some(number) = self.registration_number.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            conditions.insert(
                "registration_number".into(),
                serde_json::json!({ "$ilike": format!("%{}%", escape_like(number)) }),
            );
        }
        if let Some(status) = self.status {
            conditions.insert("status".into(), status.as_str().into());
        }
        if let Some(board_type) = self.board_type {
            conditions.insert("board_type".into(), board_type.as_str().into());
        }
        if let Some(ids) = place_ids {
            conditions.insert("place_id".into(), serde_json::json!({ "$in": ids }));
        }
        if let Some(institution_id) = self.institution_id {
            conditions.insert("institution_id".into(), serde_json::json!(institution_id));
        }
        serde_json::Value::Object(conditions)
    }
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dissolved_boards_are_final() {
        assert!(BoardStatus::Active.can_transition_to(BoardStatus::Suspended));
        assert!(BoardStatus::Suspended.can_transition_to(BoardStatus::Active));
        assert!(!BoardStatus::Dissolved.can_transition_to(BoardStatus::Active));
        assert!(!BoardStatus::Active.can_transition_to(BoardStatus::Active));
    }

    #[test]
    fn board_period_must_be_ordered() {
        let input = BoardInput {
            name: "JAC Vereda El Carmen".into(),
            board_type: BoardType::Communal,
            registration_number: "REG-0042".into(),
            resolution_number: None,
            registered_on: None,
            address: None,
            email: None,
            phone: None,
            place_id: Uuid::new_v4(),
            institution_id: None,
            period_start: NaiveDate::from_ymd_opt(2024, 7, 1),
            period_end: NaiveDate::from_ymd_opt(2024, 6, 30),
        };
        assert!(input.validate().unwrap_err().fields.contains_key("period_end"));
    }

    #[test]
    fn search_builds_ilike_conditions() {
        let search = BoardSearch {
            name: Some(" carmen ".into()),
            status: Some(BoardStatus::Active),
            ..Default::default()
        };
        let place = Uuid::new_v4();
        let clause = search.where_clause(Some(&[place]));
        assert_eq!(clause["name"]["$ilike"], "%carmen%");
        assert_eq!(clause["status"], "active");
        assert_eq!(clause["place_id"]["$in"][0], place.to_string());
        assert!(clause.get("institution_id").is_none());
    }

    #[test]
    fn search_escapes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
