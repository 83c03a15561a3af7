use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use super::{ReportError, ReportTable};

const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 60;
const HEADER_ROW: u32 = 3;

/// Title in A1, subtitle in A2, bold header on row 4, data below
pub fn render(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(&table.title))?;

    let title_format = Format::new().set_bold().set_font_size(14);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xDDDDDD))
        .set_border_bottom(FormatBorder::Thin);

    worksheet.write_string_with_format(0, 0, &table.title, &title_format)?;
    if let Some(subtitle) = &table.subtitle {
        worksheet.write_string(1, 0, subtitle)?;
    }

    for (col, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(HEADER_ROW, col as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = HEADER_ROW + 1 + row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string(excel_row, col_idx as u16, cell)?;
        }
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width as f64)?;
    }
    worksheet.set_freeze_panes(HEADER_ROW + 1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

/// Widest cell per column, clamped
pub fn column_widths(table: &ReportTable) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .saturating_add(2)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Excel sheet names: at most 31 characters, none of `[]:*?/\`
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Reporte".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReportTable {
        ReportTable {
            title: "Dignatarios: JAC El Carmen".into(),
            subtitle: None,
            columns: vec!["Nombre".into(), "Documento".into()],
            rows: vec![
                vec!["Carlos Gómez".into(), "71234567".into()],
                vec!["M".repeat(90), "1".into()],
            ],
        }
    }

    #[test]
    fn renders_a_zip_container() {
        let bytes = render(&table()).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn widths_fit_content_within_bounds() {
        assert_eq!(column_widths(&table()), vec![MAX_COLUMN_WIDTH, 11]);
    }

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sheet_name("Dignatarios: JAC El Carmen"), "Dignatarios JAC El Carmen");
        assert_eq!(sheet_name("???"), "Reporte");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
    }
}
