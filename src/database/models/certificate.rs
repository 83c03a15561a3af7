use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::board::BoardDetail;
use crate::config::ReportsConfig;
use super::officer::Officer;
use super::place::PlacePath;

/// Unambiguous alphabet: no 0/O or 1/I
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateKind {
    /// Certifies that the board exists and is registered
    Registration,
    /// Certifies the board's current officer roster
    Officers,
}

impl CertificateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateKind::Registration => "registration",
            CertificateKind::Officers => "officers",
        }
    }

    pub fn title_es(&self) -> &'static str {
        match self {
            CertificateKind::Registration => "CERTIFICADO DE EXISTENCIA Y REPRESENTACIÓN LEGAL",
            CertificateKind::Officers => "AUTO RESOLUTORIO DE INSCRIPCIÓN DE DIGNATARIOS",
        }
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(CertificateKind::Registration),
            "officers" => Ok(CertificateKind::Officers),
            other => Err(format!("unknown certificate kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Valid,
    Expired,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    pub id: Uuid,
    pub board_id: Uuid,
    pub kind: String,
    pub code: String,
    pub issued_by: Uuid,
    pub issued_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<String>,
    pub snapshot: sqlx::types::Json<CertificateSnapshot>,
}

impl Certificate {
    pub fn certificate_kind(&self) -> Option<CertificateKind> {
        self.kind.parse().ok()
    }

    /// Revocation wins over expiry
    pub fn status_at(&self, now: DateTime<Utc>) -> CertificateStatus {
        if self.revoked_at.is_some() {
            CertificateStatus::Revoked
        } else if now > self.valid_until {
            CertificateStatus::Expired
        } else {
            CertificateStatus::Valid
        }
    }
}

/// What was printed on the certificate, frozen at issue time
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CertificateSnapshot {
    pub board_name: String,
    pub board_type_label: String,
    pub registration_number: String,
    pub resolution_number: Option<String>,
    pub registered_on: Option<NaiveDate>,
    pub address: Option<String>,
    pub place_path: PlacePath,
    pub institution_name: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub officers: Vec<SnapshotOfficer>,
    pub issued_by_name: String,
    /// Issuing authority as printed; rows from before these were stored fall back to configuration
    #[serde(default)]
    pub authority_name: Option<String>,
    #[serde(default)]
    pub authority_unit: Option<String>,
    #[serde(default)]
    pub signer_title: Option<String>,
}

impl CertificateSnapshot {
    /// Freeze the board and, for roster certificates, its sorted active officers
    pub fn capture(
        kind: CertificateKind,
        detail: &BoardDetail,
        officers: &[Officer],
        issued_by_name: &str,
        authority: &ReportsConfig,
    ) -> Self {
        let board = &detail.board;
        Self {
            board_name: board.name.clone(),
            board_type_label: board.board_type_label().to_string(),
            registration_number: board.registration_number.clone(),
            resolution_number: board.resolution_number.clone(),
            registered_on: board.registered_on,
            address: board.address.clone(),
            place_path: detail.place_path.clone(),
            institution_name: detail.institution_name.clone(),
            period_start: board.period_start,
            period_end: board.period_end,
            officers: match kind {
                CertificateKind::Registration => Vec::new(),
                CertificateKind::Officers => officers
                    .iter()
                    .filter(|o| o.active)
                    .map(|o| SnapshotOfficer {
                        full_name: o.full_name.clone(),
                        document_number: o.document_number.clone(),
                        position_label: o.position_label(),
                        period_start: o.period_start,
                        period_end: o.period_end,
                    })
                    .collect(),
            },
            issued_by_name: issued_by_name.to_string(),
            authority_name: Some(authority.authority_name.clone()),
            authority_unit: Some(authority.authority_unit.clone()),
            signer_title: Some(authority.signer_title.clone()),
        }
    }

    pub fn authority_name<'a>(&'a self, fallback: &'a ReportsConfig) -> &'a str {
        self.authority_name.as_deref().unwrap_or(&fallback.authority_name)
    }

    pub fn authority_unit<'a>(&'a self, fallback: &'a ReportsConfig) -> &'a str {
        self.authority_unit.as_deref().unwrap_or(&fallback.authority_unit)
    }

    pub fn signer_title<'a>(&'a self, fallback: &'a ReportsConfig) -> &'a str {
        self.signer_title.as_deref().unwrap_or(&fallback.signer_title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotOfficer {
    pub full_name: String,
    pub document_number: String,
    pub position_label: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCertificate {
    pub kind: CertificateKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevokeCertificate {
    pub reason: String,
}

/// Public answer of the verification endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CertificateVerification {
    pub code: String,
    pub valid: bool,
    pub status: CertificateStatus,
    pub kind: String,
    pub board: VerifiedBoard,
    pub issued_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// The board as named on the certificate
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedBoard {
    pub name: String,
    pub registration_number: String,
}

impl CertificateVerification {
    pub fn from_certificate(certificate: &Certificate, now: DateTime<Utc>) -> Self {
        let status = certificate.status_at(now);
        Self {
            code: certificate.code.clone(),
            valid: status == CertificateStatus::Valid,
            status,
            kind: certificate.kind.clone(),
            board: VerifiedBoard {
                name: certificate.snapshot.board_name.clone(),
                registration_number: certificate.snapshot.registration_number.clone(),
            },
            issued_at: certificate.issued_at,
            valid_until: certificate.valid_until,
            revoked_at: certificate.revoked_at,
        }
    }
}

/// Derive a verification code `XXXX-XXXX-XXXX` from a certificate id
pub fn verification_code(id: Uuid) -> String {
    let digest = Sha256::digest(id.as_bytes());
    let chars: Vec<char> = digest
        .iter()
        .take(12)
        .map(|b| CODE_ALPHABET[(*b as usize) % CODE_ALPHABET.len()] as char)
        .collect();
    chars
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Accept codes typed in lower case or without dashes
pub fn normalize_code(input: &str) -> Option<String> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if compact.len() != 12 || !compact.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
        return None;
    }
    Some(format!("{}-{}-{}", &compact[0..4], &compact[4..8], &compact[8..12]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn certificate(valid_until: DateTime<Utc>, revoked: bool) -> Certificate {
        let id = Uuid::new_v4();
        Certificate {
            id,
            board_id: Uuid::new_v4(),
            kind: "registration".into(),
            code: verification_code(id),
            issued_by: Uuid::new_v4(),
            issued_at: Utc::now(),
            valid_until,
            revoked_at: revoked.then(Utc::now),
            revoked_reason: None,
            snapshot: sqlx::types::Json(CertificateSnapshot::default()),
        }
    }

    #[test]
    fn code_shape_is_stable() {
        let id = Uuid::new_v4();
        let code = verification_code(id);
        assert_eq!(code.len(), 14);
        assert_eq!(code, verification_code(id));
        assert_eq!(code.matches('-').count(), 2);
        assert_eq!(normalize_code(&code).as_deref(), Some(code.as_str()));
    }

    #[test]
    fn normalizes_user_typed_codes() {
        assert_eq!(normalize_code("abcd efgh jkmn").as_deref(), Some("ABCD-EFGH-JKMN"));
        assert_eq!(normalize_code("ABCDEFGHJKMN").as_deref(), Some("ABCD-EFGH-JKMN"));
        assert!(normalize_code("ABCD-EFGH-JKM0").is_none());
        assert!(normalize_code("short").is_none());
    }

    #[test]
    fn status_prefers_revocation() {
        let now = Utc::now();
        assert_eq!(certificate(now + Duration::days(1), false).status_at(now), CertificateStatus::Valid);
        assert_eq!(certificate(now - Duration::days(1), false).status_at(now), CertificateStatus::Expired);
        assert_eq!(certificate(now - Duration::days(1), true).status_at(now), CertificateStatus::Revoked);
    }

    #[test]
    fn verification_payload_shape() {
        let mut cert = certificate(Utc::now() + Duration::days(30), false);
        cert.snapshot.0.board_name = "JAC Centro".into();
        cert.snapshot.0.registration_number = "REG-1".into();

        let payload = serde_json::to_value(CertificateVerification::from_certificate(&cert, Utc::now())).unwrap();
        assert_eq!(payload["valid"], true);
        assert_eq!(payload["status"], "valid");
        assert_eq!(payload["kind"], "registration");
        assert_eq!(payload["board"]["name"], "JAC Centro");
        assert_eq!(payload["board"]["registration_number"], "REG-1");
        assert!(payload["issued_at"].is_string());
        assert!(payload["valid_until"].is_string());
    }

    #[test]
    fn registration_snapshot_omits_officers() {
        use crate::database::models::{Board, BoardDetail, Officer, PlacePath};

        let board = Board {
            id: Uuid::new_v4(),
            name: "JAC Centro".into(),
            board_type: "communal".into(),
            registration_number: "REG-1".into(),
            resolution_number: None,
            registered_on: None,
            address: None,
            email: None,
            phone: None,
            status: "active".into(),
            place_id: Uuid::new_v4(),
            institution_id: None,
            period_start: None,
            period_end: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let officer = Officer {
            id: Uuid::new_v4(),
            board_id: board.id,
            commission_id: None,
            full_name: "Luz Marina Ríos".into(),
            document_number: "43123456".into(),
            position: "president".into(),
            phone: None,
            email: None,
            period_start: None,
            period_end: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let detail = BoardDetail { board, place_path: PlacePath::default(), institution_name: None };
        let officers = vec![officer];

        let authority = crate::config::AppConfig::from_env().reports;
        let registration =
            CertificateSnapshot::capture(CertificateKind::Registration, &detail, &officers, "Ana", &authority);
        assert!(registration.officers.is_empty());
        assert_eq!(registration.signer_title.as_deref(), Some(authority.signer_title.as_str()));
        assert_eq!(registration.board_type_label, "Junta de Acción Comunal");

        let roster = CertificateSnapshot::capture(CertificateKind::Officers, &detail, &officers, "Ana", &authority);
        assert_eq!(roster.officers.len(), 1);
        assert_eq!(roster.officers[0].position_label, "Presidente");
    }

    #[test]
    fn older_snapshots_fall_back_to_configured_authority() {
        let stored = serde_json::json!({
            "board_name": "JAC Centro",
            "board_type_label": "Junta de Acción Comunal",
            "registration_number": "REG-1",
            "resolution_number": null,
            "registered_on": null,
            "address": null,
            "place_path": { "municipality": null, "province": null, "department": null },
            "institution_name": null,
            "period_start": null,
            "period_end": null,
            "issued_by_name": "Ana"
        });
        let snapshot: CertificateSnapshot = serde_json::from_value(stored).unwrap();
        let config = crate::config::AppConfig::from_env().reports;
        assert!(snapshot.authority_name.is_none());
        assert_eq!(snapshot.authority_name(&config), config.authority_name);
        assert_eq!(snapshot.signer_title(&config), config.signer_title);
    }
}
