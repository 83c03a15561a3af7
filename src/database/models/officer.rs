use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::validation::{is_valid_document_number, normalize_optional, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerPosition {
    President,
    VicePresident,
    Treasurer,
    Secretary,
    Fiscal,
    Coordinator,
    Delegate,
    Member,
}

impl OfficerPosition {
    pub const ALL: [OfficerPosition; 8] = [
        OfficerPosition::President,
        OfficerPosition::VicePresident,
        OfficerPosition::Treasurer,
        OfficerPosition::Secretary,
        OfficerPosition::Fiscal,
        OfficerPosition::Coordinator,
        OfficerPosition::Delegate,
        OfficerPosition::Member,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OfficerPosition::President => "president",
            OfficerPosition::VicePresident => "vice_president",
            OfficerPosition::Treasurer => "treasurer",
            OfficerPosition::Secretary => "secretary",
            OfficerPosition::Fiscal => "fiscal",
            OfficerPosition::Coordinator => "coordinator",
            OfficerPosition::Delegate => "delegate",
            OfficerPosition::Member => "member",
        }
    }

    pub fn label_es(&self) -> &'static str {
        match self {
            OfficerPosition::President => "Presidente",
            OfficerPosition::VicePresident => "Vicepresidente",
            OfficerPosition::Treasurer => "Tesorero",
            OfficerPosition::Secretary => "Secretario",
            OfficerPosition::Fiscal => "Fiscal",
            OfficerPosition::Coordinator => "Coordinador de comisión",
            OfficerPosition::Delegate => "Delegado",
            OfficerPosition::Member => "Vocal",
        }
    }

    /// Positions that only one active officer per board may hold
    pub fn is_single_holder(&self) -> bool {
        matches!(
            self,
            OfficerPosition::President
                | OfficerPosition::VicePresident
                | OfficerPosition::Treasurer
                | OfficerPosition::Secretary
                | OfficerPosition::Fiscal
        )
    }
}

impl fmt::Display for OfficerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfficerPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfficerPosition::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown officer position '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Officer {
    pub id: Uuid,
    pub board_id: Uuid,
    pub commission_id: Option<Uuid>,
    pub full_name: String,
    pub document_number: String,
    pub position: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Officer {
    pub fn officer_position(&self) -> Option<OfficerPosition> {
        self.position.parse().ok()
    }

    pub fn position_label(&self) -> String {
        self.officer_position()
            .map(|p| p.label_es().to_string())
            .unwrap_or_else(|| self.position.clone())
    }
}

/// Sort a roster by position rank, then name
pub fn sort_roster(officers: &mut [Officer]) {
    officers.sort_by(|a, b| {
        let rank = |o: &Officer| o.officer_position().unwrap_or(OfficerPosition::Member);
        rank(a).cmp(&rank(b)).then_with(|| a.full_name.cmp(&b.full_name))
    });
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfficerInput {
    pub full_name: String,
    pub document_number: String,
    pub position: OfficerPosition,
    pub commission_id: Option<Uuid>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl OfficerInput {
    /// Blank optional fields become NULL
    pub fn normalize(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.document_number = self.document_number.trim().to_uppercase();
        self.phone = normalize_optional(self.phone);
        self.email = normalize_optional(self.email);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("full_name", &self.full_name, 160);
        if !is_valid_document_number(&self.document_number) {
            errors.add("document_number", "Document number must be 5 to 15 letters or digits");
        }
        errors.phone("phone", self.phone.as_deref());
        errors.email("email", self.email.as_deref());
        errors.period("period_end", self.period_start, self.period_end);
        if self.position == OfficerPosition::Coordinator && self.commission_id.is_none() {
            errors.add("commission_id", "A commission coordinator must reference a commission");
        }
        errors.into_result()
    }

    /// Officer terms must sit inside the board's term when both are known
    pub fn validate_within(&self, board_start: Option<NaiveDate>, board_end: Option<NaiveDate>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let (Some(start), Some(board_start)) = (self.period_start, board_start) {
            if start < board_start {
                errors.add("period_start", "Officer period cannot start before the board period");
            }
        }
        if let (Some(end), Some(board_end)) = (self.period_end, board_end) {
            if end > board_end {
                errors.add("period_end", "Officer period cannot end after the board period");
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(position: OfficerPosition) -> OfficerInput {
        OfficerInput {
            full_name: "Carlos Gómez".into(),
            document_number: "71234567".into(),
            position,
            commission_id: None,
            phone: None,
            email: None,
            period_start: NaiveDate::from_ymd_opt(2024, 7, 1),
            period_end: NaiveDate::from_ymd_opt(2028, 6, 30),
            active: true,
        }
    }

    #[test]
    fn single_holder_positions() {
        assert!(OfficerPosition::President.is_single_holder());
        assert!(OfficerPosition::Fiscal.is_single_holder());
        assert!(!OfficerPosition::Delegate.is_single_holder());
        assert!(!OfficerPosition::Member.is_single_holder());
    }

    #[test]
    fn positions_parse_from_storage_names() {
        for position in OfficerPosition::ALL {
            assert_eq!(position.as_str().parse::<OfficerPosition>().unwrap(), position);
        }
        assert!("chairman".parse::<OfficerPosition>().is_err());
    }

    #[test]
    fn coordinator_requires_commission() {
        let err = input(OfficerPosition::Coordinator).validate().unwrap_err();
        assert!(err.fields.contains_key("commission_id"));
        assert!(input(OfficerPosition::President).validate().is_ok());
    }

    #[test]
    fn officer_period_inside_board_period() {
        let officer = input(OfficerPosition::Treasurer);
        assert!(officer
            .validate_within(NaiveDate::from_ymd_opt(2024, 7, 1), NaiveDate::from_ymd_opt(2028, 6, 30))
            .is_ok());
        let err = officer
            .validate_within(NaiveDate::from_ymd_opt(2024, 8, 1), NaiveDate::from_ymd_opt(2027, 12, 31))
            .unwrap_err();
        assert!(err.fields.contains_key("period_start"));
        assert!(err.fields.contains_key("period_end"));
    }
}
