use chrono::{DateTime, Utc};

use super::pdf::{add_page_numbers, Align, Font, PdfDocument, A4_PORTRAIT};
use super::text::{short_date, spanish_date, wrap_text};
use crate::config::ReportsConfig;
use crate::database::models::{Certificate, CertificateKind, CertificateSnapshot};

const MARGIN: f64 = 60.0;
const BODY: f64 = 11.0;

pub fn verification_url(base_url: &str, code: &str) -> String {
    format!("{}/certificates/verify/{}", base_url.trim_end_matches('/'), code)
}

fn registration_paragraph(snapshot: &CertificateSnapshot, signer_title: &str) -> String {
    let mut text = format!(
        "El suscrito {} certifica que la {} denominada \"{}\"",
        signer_title, snapshot.board_type_label, snapshot.board_name
    );
    if let Some(address) = &snapshot.address {
        text.push_str(&format!(", con domicilio en {}", address));
    }
    let place = snapshot.place_path.describe_es();
    if !place.is_empty() {
        text.push_str(&format!(", jurisdicción del {}", place));
    }
    text.push_str(&format!(
        ", se encuentra inscrita en el registro de organizaciones comunitarias bajo el número {}",
        snapshot.registration_number
    ));
    if let Some(resolution) = &snapshot.resolution_number {
        text.push_str(&format!(", mediante resolución {}", resolution));
    }
    if let Some(date) = snapshot.registered_on {
        text.push_str(&format!(" del {}", spanish_date(date)));
    }
    text.push_str(", y que su personería jurídica se encuentra vigente");
    if let (Some(start), Some(end)) = (snapshot.period_start, snapshot.period_end) {
        text.push_str(&format!(
            " para el periodo comprendido entre el {} y el {}",
            spanish_date(start),
            spanish_date(end)
        ));
    }
    text.push('.');
    text
}

fn officers_paragraph(snapshot: &CertificateSnapshot, signer_title: &str) -> String {
    let place = snapshot.place_path.describe_es();
    format!(
        "El suscrito {} resuelve inscribir y reconocer como dignatarios de la {} denominada \"{}\", \
         registrada bajo el número {}{}, a las personas que se relacionan a continuación, \
         quienes ejercerán sus funciones conforme a los estatutos de la organización.",
        signer_title,
        snapshot.board_type_label,
        snapshot.board_name,
        snapshot.registration_number,
        if place.is_empty() { String::new() } else { format!(" en el {}", place) }
    )
}

/// A4 portrait certificate re-rendered from the stored snapshot
pub fn render(certificate: &Certificate, config: &ReportsConfig, now: DateTime<Utc>) -> Vec<u8> {
    let snapshot = &certificate.snapshot.0;
    let kind = certificate.certificate_kind().unwrap_or(CertificateKind::Registration);
    let authority_name = snapshot.authority_name(config);
    let authority_unit = snapshot.authority_unit(config);
    let signer_title = snapshot.signer_title(config);

    let mut doc = PdfDocument::new(A4_PORTRAIT);
    let width = doc.width() - 2.0 * MARGIN;
    let bottom = MARGIN + 40.0;
    let mut y = doc.height() - MARGIN;

    y = doc.paragraph(MARGIN, y, width, 14.0, Font::Bold, Align::Center, &authority_name.to_uppercase());
    y = doc.paragraph(MARGIN, y, width, 11.0, Font::Regular, Align::Center, authority_unit);
    y -= 6.0;
    doc.line(MARGIN, y, MARGIN + width, y, 1.0);
    y -= 28.0;

    y = doc.paragraph(MARGIN, y, width, 15.0, Font::Bold, Align::Center, kind.title_es());
    y = doc.paragraph(
        MARGIN,
        y,
        width,
        9.5,
        Font::Regular,
        Align::Center,
        &format!("Código de verificación: {}", certificate.code),
    );
    y -= 12.0;

    if let Some(revoked_at) = certificate.revoked_at {
        y = doc.paragraph(
            MARGIN,
            y,
            width,
            12.0,
            Font::Bold,
            Align::Center,
            &format!("DOCUMENTO ANULADO EL {}", spanish_date(revoked_at.date_naive()).to_uppercase()),
        );
        y -= 8.0;
    }

    let paragraph = match kind {
        CertificateKind::Registration => registration_paragraph(snapshot, signer_title),
        CertificateKind::Officers => officers_paragraph(snapshot, signer_title),
    };
    y = doc.paragraph(MARGIN, y, width, BODY, Font::Regular, Align::Left, &paragraph);

    if let Some(institution) = &snapshot.institution_name {
        y -= 4.0;
        y = doc.paragraph(
            MARGIN,
            y,
            width,
            BODY,
            Font::Regular,
            Align::Left,
            &format!("Entidad que acompaña a la organización: {}.", institution),
        );
    }

    if kind == CertificateKind::Officers {
        y -= 10.0;
        let columns: [(&str, f64); 4] = [("Cargo", 0.24), ("Nombre", 0.38), ("Documento", 0.16), ("Periodo", 0.22)];
        let row_size = 9.5;
        let leading = row_size * 1.3;

        let header_height = leading + 8.0;
        doc.fill_rect(MARGIN, y - header_height, width, header_height, 0.88);
        let mut x = MARGIN;
        for (label, share) in columns {
            doc.text(x + 4.0, y - 4.0 - row_size, row_size, Font::Bold, label);
            x += share * width;
        }
        y -= header_height;

        for officer in &snapshot.officers {
            let period = match (officer.period_start, officer.period_end) {
                (None, None) => String::new(),
                (start, end) => format!("{} - {}", short_date(start), short_date(end)),
            };
            let cells = [
                officer.position_label.as_str(),
                officer.full_name.as_str(),
                officer.document_number.as_str(),
                period.as_str(),
            ];
            let wrapped: Vec<Vec<String>> = cells
                .iter()
                .zip(columns.iter())
                .map(|(cell, (_, share))| wrap_text(cell, share * width - 8.0, row_size, false))
                .collect();
            let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
            let row_height = lines as f64 * leading + 8.0;

            if y - row_height < bottom {
                doc.add_page();
                y = doc.height() - MARGIN;
            }

            let mut x = MARGIN;
            for (cell_lines, (_, share)) in wrapped.iter().zip(columns.iter()) {
                let mut baseline = y - 4.0 - row_size;
                for line in cell_lines {
                    doc.text(x + 4.0, baseline, row_size, Font::Regular, line);
                    baseline -= leading;
                }
                x += share * width;
            }
            doc.line(MARGIN, y - row_height, MARGIN + width, y - row_height, 0.3);
            y -= row_height;
        }
        y -= 6.0;
    }

    // Closing block needs roughly 170pt: dates, signature and verification link
    if y - 170.0 < bottom {
        doc.add_page();
        y = doc.height() - MARGIN;
    }

    y -= 8.0;
    y = doc.paragraph(
        MARGIN,
        y,
        width,
        BODY,
        Font::Regular,
        Align::Left,
        &format!(
            "Se expide a solicitud de la parte interesada el {}. Este documento es válido hasta el {}.",
            spanish_date(certificate.issued_at.date_naive()),
            spanish_date(certificate.valid_until.date_naive())
        ),
    );

    y -= 60.0;
    let signature_width = 220.0;
    let signature_x = MARGIN + (width - signature_width) / 2.0;
    doc.line(signature_x, y, signature_x + signature_width, y, 0.8);
    y -= 14.0;
    doc.aligned_text(MARGIN, width, y, 10.5, Font::Bold, Align::Center, signer_title);
    y -= 13.0;
    doc.aligned_text(MARGIN, width, y, 9.0, Font::Regular, Align::Center, authority_unit);
    y -= 26.0;

    doc.paragraph(
        MARGIN,
        y,
        width,
        8.5,
        Font::Regular,
        Align::Left,
        &format!(
            "Elaboró: {}. Verifique la autenticidad de este documento en {}",
            snapshot.issued_by_name,
            verification_url(&config.public_base_url, &certificate.code)
        ),
    );

    let generated = format!("Generado el {}", spanish_date(now.date_naive()));
    doc.select_page(0);
    doc.aligned_text(MARGIN, width, MARGIN - 24.0, 7.5, Font::Regular, Align::Left, &generated);

    add_page_numbers(&mut doc);
    doc.finish(kind.title_es())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::certificate::verification_code;
    use crate::database::models::{PlacePath, SnapshotOfficer};
    use chrono::{Duration, NaiveDate};
    use uuid::Uuid;

    fn config() -> ReportsConfig {
        ReportsConfig {
            authority_name: "Gobernación de Antioquia".into(),
            authority_unit: "Secretaría de Participación".into(),
            signer_title: "Secretario de Participación".into(),
            certificate_validity_days: 90,
            public_base_url: "https://juntas.example.com/".into(),
        }
    }

    fn snapshot(officers: usize) -> CertificateSnapshot {
        CertificateSnapshot {
            board_name: "JAC El Carmen".into(),
            board_type_label: "Junta de Acción Comunal".into(),
            registration_number: "REG-0042".into(),
            resolution_number: Some("RES-77".into()),
            registered_on: NaiveDate::from_ymd_opt(2020, 3, 14),
            address: Some("Calle 10 # 5-20".into()),
            place_path: PlacePath {
                municipality: Some("Rionegro".into()),
                province: Some("Oriente".into()),
                department: Some("Antioquia".into()),
            },
            institution_name: None,
            period_start: NaiveDate::from_ymd_opt(2024, 7, 1),
            period_end: NaiveDate::from_ymd_opt(2028, 6, 30),
            officers: (0..officers)
                .map(|i| SnapshotOfficer {
                    full_name: format!("Dignatario {}", i),
                    document_number: format!("7100{:04}", i),
                    position_label: "Vocal".into(),
                    period_start: None,
                    period_end: None,
                })
                .collect(),
            issued_by_name: "Ana Pérez".into(),
            authority_name: Some("Gobernación de Antioquia".into()),
            authority_unit: Some("Secretaría de Participación".into()),
            signer_title: Some("Secretario de Participación".into()),
        }
    }

    fn certificate(kind: CertificateKind, officers: usize) -> Certificate {
        let id = Uuid::new_v4();
        Certificate {
            id,
            board_id: Uuid::new_v4(),
            kind: kind.as_str().into(),
            code: verification_code(id),
            issued_by: Uuid::new_v4(),
            issued_at: Utc::now(),
            valid_until: Utc::now() + Duration::days(90),
            revoked_at: None,
            revoked_reason: None,
            snapshot: sqlx::types::Json(snapshot(officers)),
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        bytes.windows(12).filter(|w| *w == b"/Type /Page ").count()
    }

    #[test]
    fn verification_url_trims_trailing_slash() {
        assert_eq!(
            verification_url("https://juntas.example.com/", "ABCD-EFGH-JKMN"),
            "https://juntas.example.com/certificates/verify/ABCD-EFGH-JKMN"
        );
    }

    #[test]
    fn registration_text_names_the_board() {
        let text = registration_paragraph(&snapshot(0), "Secretario");
        assert!(text.contains("\"JAC El Carmen\""));
        assert!(text.contains("bajo el número REG-0042"));
        assert!(text.contains("del 14 de marzo de 2020"));
        assert!(text.contains("Municipio de Rionegro"));
    }

    #[test]
    fn renders_single_page_registration() {
        let cert = certificate(CertificateKind::Registration, 0);
        let bytes = render(&cert, &config(), Utc::now());
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(page_count(&bytes), 1);
        let code = cert.code.as_bytes();
        assert!(bytes.windows(code.len()).any(|w| w == code));
    }

    #[test]
    fn long_rosters_continue_on_new_pages() {
        let bytes = render(&certificate(CertificateKind::Officers, 80), &config(), Utc::now());
        assert!(page_count(&bytes) > 1);
    }

    #[test]
    fn reissued_documents_keep_the_printed_authority() {
        let cert = certificate(CertificateKind::Registration, 0);
        let mut moved = config();
        moved.authority_name = "Alcaldía de Medellín".into();
        moved.authority_unit = "Subsecretaría de Organización Social".into();
        moved.signer_title = "Subsecretario".into();

        let before = render(&cert, &config(), Utc::now());
        let after = render(&cert, &moved, Utc::now());

        let contains = |bytes: &[u8], text: &str| {
            let needle = crate::reports::pdf::encode_win_ansi(text);
            bytes.windows(needle.len()).any(|w| w == needle.as_slice())
        };
        for bytes in [&before, &after] {
            assert!(contains(bytes, "GOBERNACI"));
            assert!(contains(bytes, "Secretario de Participaci"));
            assert!(!contains(bytes, "MEDELL"));
            assert!(!contains(bytes, "Subsecretario"));
        }
    }
}
