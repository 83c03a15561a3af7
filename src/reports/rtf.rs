//! RTF 1 output for word processors.

use super::ReportTable;

/// Page width in twips for A4 landscape minus 1" margins
const USABLE_TWIPS: usize = 16838 - 2 * 1134;

/// Escape RTF control characters and write non-ASCII as `\uN?`
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\line "),
            '\t' => out.push_str("\\tab "),
            c if c.is_ascii_control() => {}
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // RTF takes signed 16-bit values
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

pub fn render(table: &ReportTable) -> Vec<u8> {
    let mut doc = String::new();
    doc.push_str("{\\rtf1\\ansi\\ansicpg1252\\deff0\n");
    doc.push_str("{\\fonttbl{\\f0\\fswiss Helvetica;}}\n");
    doc.push_str("\\paperw16838\\paperh11906\\landscape\\margl1134\\margr1134\\margt1134\\margb1134\n");

    doc.push_str(&format!("{{\\pard\\sa120\\b\\fs28 {}\\par}}\n", escape(&table.title)));
    if let Some(subtitle) = &table.subtitle {
        doc.push_str(&format!("{{\\pard\\sa240\\fs20 {}\\par}}\n", escape(subtitle)));
    }

    let columns = table.columns.len().max(1);
    let cell_width = USABLE_TWIPS / columns;
    let row_definition: String = {
        let mut def = String::from("\\trowd\\trgaph70\\trhdr");
        for i in 1..=columns {
            def.push_str(&format!(
                "\\clbrdrt\\brdrs\\clbrdrl\\brdrs\\clbrdrb\\brdrs\\clbrdrr\\brdrs\\cellx{}",
                cell_width * i
            ));
        }
        def
    };

    doc.push_str(&row_definition);
    doc.push('\n');
    for header in &table.columns {
        doc.push_str(&format!("\\pard\\intbl\\b\\fs18 {}\\b0\\cell\n", escape(header)));
    }
    doc.push_str("\\row\n");

    let body_definition = row_definition.replace("\\trhdr", "");
    for row in &table.rows {
        doc.push_str(&body_definition);
        doc.push('\n');
        for i in 0..columns {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            doc.push_str(&format!("\\pard\\intbl\\fs18 {}\\cell\n", escape(cell)));
        }
        doc.push_str("\\row\n");
    }

    if table.rows.is_empty() {
        doc.push_str("\\pard\\fs18 Sin registros\\par\n");
    }

    doc.push_str("\\pard\\par}\n");
    doc.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape("a\\b{c}"), "a\\\\b\\{c\\}");
        assert_eq!(escape("uno\ndos"), "uno\\line dos");
    }

    #[test]
    fn escapes_non_ascii_as_unicode() {
        assert_eq!(escape("Acción"), "Acci\\u243?n");
        assert_eq!(escape("Ñ"), "\\u209?");
        // Characters outside the BMP become a surrogate pair with signed values
        assert_eq!(escape("😀"), "\\u-10179?\\u-8704?");
    }

    #[test]
    fn renders_one_row_per_record() {
        let table = ReportTable {
            title: "Juntas".into(),
            subtitle: Some("Estado: activa".into()),
            columns: vec!["Nombre".into(), "Registro".into()],
            rows: vec![vec!["JAC Centro".into(), "R-1".into()], vec!["JAC Norte".into(), "R-2".into()]],
        };
        let rtf = String::from_utf8(render(&table)).unwrap();
        assert!(rtf.starts_with("{\\rtf1"));
        assert!(rtf.ends_with("}\n"));
        assert_eq!(rtf.matches("\\row").count(), 3);
        assert!(rtf.contains("JAC Norte\\cell"));
    }
}
