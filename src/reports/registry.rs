//! Report tables built from registry data.

use chrono::NaiveDate;

use super::text::{short_date, spanish_date};
use super::ReportTable;
use crate::database::models::{BoardDetail, BoardStatus, Officer};

pub fn board_listing(boards: &[BoardDetail], status: Option<BoardStatus>, generated_on: NaiveDate) -> ReportTable {
    let mut subtitle = format!("Generado el {}. Total: {}", spanish_date(generated_on), boards.len());
    if let Some(status) = status {
        subtitle.push_str(&format!(". Estado: {}", status.label_es()));
    }

    ReportTable {
        title: "Juntas registradas".to_string(),
        subtitle: Some(subtitle),
        columns: [
            "Nombre",
            "Tipo",
            "Registro",
            "Resolución",
            "Municipio",
            "Provincia",
            "Estado",
            "Periodo",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect(),
        rows: boards
            .iter()
            .map(|detail| {
                let board = &detail.board;
                vec![
                    board.name.clone(),
                    board.board_type_label().to_string(),
                    board.registration_number.clone(),
                    board.resolution_number.clone().unwrap_or_default(),
                    detail.place_path.municipality.clone().unwrap_or_default(),
                    detail.place_path.province.clone().unwrap_or_default(),
                    board.board_status().map(|s| s.label_es().to_string()).unwrap_or_else(|| board.status.clone()),
                    period(board.period_start, board.period_end),
                ]
            })
            .collect(),
    }
}

/// Officers are expected already sorted by rank
pub fn officer_roster(detail: &BoardDetail, officers: &[Officer], generated_on: NaiveDate) -> ReportTable {
    let board = &detail.board;
    let place = detail.place_path.describe_es();

    ReportTable {
        title: format!("Dignatarios de {}", board.name),
        subtitle: Some(format!(
            "Registro {}. {}. Generado el {}",
            board.registration_number,
            if place.is_empty() { "Sin ubicación".to_string() } else { place },
            spanish_date(generated_on)
        )),
        columns: ["Cargo", "Nombre", "Documento", "Teléfono", "Correo", "Periodo", "Activo"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: officers
            .iter()
            .map(|o| {
                vec![
                    o.position_label(),
                    o.full_name.clone(),
                    o.document_number.clone(),
                    o.phone.clone().unwrap_or_default(),
                    o.email.clone().unwrap_or_default(),
                    period(o.period_start, o.period_end),
                    if o.active { "Sí" } else { "No" }.to_string(),
                ]
            })
            .collect(),
    }
}

fn period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (None, None) => String::new(),
        _ => format!("{} - {}", short_date(start), short_date(end)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Board, PlacePath};
    use chrono::Utc;
    use uuid::Uuid;

    fn detail() -> BoardDetail {
        BoardDetail {
            board: Board {
                id: Uuid::new_v4(),
                name: "JAC El Carmen".into(),
                board_type: "communal".into(),
                registration_number: "REG-0042".into(),
                resolution_number: Some("RES-77".into()),
                registered_on: None,
                address: None,
                email: None,
                phone: None,
                status: "suspended".into(),
                place_id: Uuid::new_v4(),
                institution_id: None,
                period_start: NaiveDate::from_ymd_opt(2024, 7, 1),
                period_end: NaiveDate::from_ymd_opt(2028, 6, 30),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            place_path: PlacePath {
                municipality: Some("Rionegro".into()),
                province: Some("Oriente".into()),
                department: Some("Antioquia".into()),
            },
            institution_name: None,
        }
    }

    #[test]
    fn listing_rows_use_spanish_labels() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let table = board_listing(&[detail()], Some(BoardStatus::Suspended), today);
        assert_eq!(table.columns.len(), table.rows[0].len());
        assert_eq!(table.rows[0][1], "Junta de Acción Comunal");
        assert_eq!(table.rows[0][6], "Suspendida");
        assert_eq!(table.rows[0][7], "01/07/2024 - 30/06/2028");
        assert!(table.subtitle.unwrap().contains("18 de octubre de 2026"));
    }

    #[test]
    fn empty_periods_stay_blank() {
        assert_eq!(period(None, None), "");
    }
}
