use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::validation::{normalize_optional, ValidationErrors};

/// Level of a place in the department > province > municipality hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Department,
    Province,
    Municipality,
}

impl PlaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Department => "department",
            PlaceKind::Province => "province",
            PlaceKind::Municipality => "municipality",
        }
    }

    /// Kind the parent must have; departments are roots
    pub fn expected_parent(&self) -> Option<PlaceKind> {
        match self {
            PlaceKind::Department => None,
            PlaceKind::Province => Some(PlaceKind::Department),
            PlaceKind::Municipality => Some(PlaceKind::Province),
        }
    }

    pub fn label_es(&self) -> &'static str {
        match self {
            PlaceKind::Department => "Departamento",
            PlaceKind::Province => "Provincia",
            PlaceKind::Municipality => "Municipio",
        }
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "department" => Ok(PlaceKind::Department),
            "province" => Ok(PlaceKind::Province),
            "municipality" => Ok(PlaceKind::Municipality),
            other => Err(format!("unknown place kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub code: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    pub fn place_kind(&self) -> Option<PlaceKind> {
        self.kind.parse().ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceInput {
    pub name: String,
    pub kind: PlaceKind,
    pub code: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl PlaceInput {
    /// Blank optional fields become NULL
    pub fn normalize(mut self) -> Self {
        self.code = normalize_optional(self.code);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &self.name, 120);
        errors.optional_text("code", self.code.as_deref(), 20);
        match (self.kind.expected_parent(), self.parent_id) {
            (None, Some(_)) => errors.add("parent_id", "A department cannot have a parent"),
            (Some(kind), None) => errors.add("parent_id", format!("A {} requires a {} parent", self.kind, kind)),
            _ => {}
        }
        errors.into_result()
    }

    /// Checked once the parent row is loaded
    pub fn validate_parent(&self, parent: &Place) -> Result<(), ValidationErrors> {
        let expected = self.kind.expected_parent();
        if expected.is_none() || parent.place_kind() != expected {
            return Err(ValidationErrors::single(
                "parent_id",
                format!("Parent of a {} must be a {}", self.kind, expected.map(|k| k.as_str()).unwrap_or("none")),
            ));
        }
        Ok(())
    }
}

/// Municipality → province → department chain used in documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacePath {
    pub municipality: Option<String>,
    pub province: Option<String>,
    pub department: Option<String>,
}

impl PlacePath {
    pub fn from_chain(chain: &[Place]) -> Self {
        let mut path = Self::default();
        for place in chain {
            match place.place_kind() {
                Some(PlaceKind::Municipality) => path.municipality = Some(place.name.clone()),
                Some(PlaceKind::Province) => path.province = Some(place.name.clone()),
                Some(PlaceKind::Department) => path.department = Some(place.name.clone()),
                None => {}
            }
        }
        path
    }

    /// "Municipio de X, Provincia de Y, Departamento de Z"
    pub fn describe_es(&self) -> String {
        [
            (PlaceKind::Municipality, &self.municipality),
            (PlaceKind::Province, &self.province),
            (PlaceKind::Department, &self.department),
        ]
        .iter()
        .filter_map(|(kind, name)| name.as_ref().map(|n| format!("{} de {}", kind.label_es(), n)))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, kind: PlaceKind) -> Place {
        Place {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: kind.to_string(),
            code: None,
            parent_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn hierarchy_parent_rules() {
        let dept = PlaceInput { name: "Antioquia".into(), kind: PlaceKind::Department, code: None, parent_id: Some(Uuid::new_v4()) };
        assert!(dept.validate().is_err());

        let muni = PlaceInput { name: "Rionegro".into(), kind: PlaceKind::Municipality, code: None, parent_id: None };
        assert!(muni.validate().is_err());

        let muni = PlaceInput { parent_id: Some(Uuid::new_v4()), ..muni };
        assert!(muni.validate().is_ok());
        assert!(muni.validate_parent(&place("Oriente", PlaceKind::Province)).is_ok());
        assert!(muni.validate_parent(&place("Antioquia", PlaceKind::Department)).is_err());
    }

    #[test]
    fn path_describes_in_spanish() {
        let chain = vec![
            place("Rionegro", PlaceKind::Municipality),
            place("Oriente", PlaceKind::Province),
            place("Antioquia", PlaceKind::Department),
        ];
        let path = PlacePath::from_chain(&chain);
        assert_eq!(
            path.describe_es(),
            "Municipio de Rionegro, Provincia de Oriente, Departamento de Antioquia"
        );
    }
}
