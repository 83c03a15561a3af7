use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Field-level validation failures collected before touching the database
#[derive(Debug, Default, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", .fields.keys().cloned().collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// First message for a field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn require_text(&mut self, field: &str, value: &str, max_len: usize) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, "This field is required");
        } else if trimmed.chars().count() > max_len {
            self.add(field, format!("Must be at most {} characters", max_len));
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if let Some(value) = value {
            self.require_text(field, value, max_len);
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            if !is_valid_email(value) {
                self.add(field, "Invalid email address");
            }
        }
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            if !is_valid_phone(value) {
                self.add(field, "Phone must have 7 to 15 digits");
            }
        }
    }

    pub fn period(&mut self, field: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                self.add(field, "Period end must be after period start");
            }
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

pub fn is_valid_phone(value: &str) -> bool {
    if !value.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ')) {
        return false;
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

pub fn is_valid_document_number(value: &str) -> bool {
    let value = value.trim();
    (5..=15).contains(&value.len()) && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// At least 8 characters including one letter and one digit
pub fn is_acceptable_password(value: &str) -> bool {
    value.chars().count() >= 8
        && value.chars().any(|c| c.is_alphabetic())
        && value.chars().any(|c| c.is_ascii_digit())
}

/// Trim and drop empty optional strings so blank form fields store as NULL
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
