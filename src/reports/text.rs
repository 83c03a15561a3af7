//! Text helpers shared by the document renderers.

use chrono::{Datelike, NaiveDate};

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// "18 de octubre de 2026"
pub fn spanish_date(date: NaiveDate) -> String {
    format!("{} de {} de {}", date.day(), MONTHS_ES[date.month0() as usize], date.year())
}

/// Short numeric form used in table cells
pub fn short_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

/// Average advance of a Helvetica glyph, in ems
fn glyph_em(c: char, bold: bool) -> f64 {
    let base = match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'í' | 'ì' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '-' => 0.33,
        'm' | 'w' | 'M' | 'W' => 0.83,
        c if c.is_uppercase() => 0.67,
        c if c.is_ascii_digit() => 0.556,
        _ => 0.52,
    };
    if bold {
        base * 1.06
    } else {
        base
    }
}

/// Estimated rendered width in points
pub fn text_width(text: &str, font_size: f64, bold: bool) -> f64 {
    text.chars().map(|c| glyph_em(c, bold)).sum::<f64>() * font_size
}

/// Greedy word wrap against an estimated width; words longer than a line are split
pub fn wrap_text(text: &str, max_width: f64, font_size: f64, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() { word.to_string() } else { format!("{} {}", line, word) };
            if text_width(&candidate, font_size, bold) <= max_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }

            if text_width(word, font_size, bold) <= max_width {
                line = word.to_string();
            } else {
                let mut chunk = String::new();
                for c in word.chars() {
                    chunk.push(c);
                    if text_width(&chunk, font_size, bold) > max_width && chunk.chars().count() > 1 {
                        chunk.pop();
                        lines.push(std::mem::take(&mut chunk));
                        chunk.push(c);
                    }
                }
                line = chunk;
            }
        }

        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanish_dates() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(spanish_date(date), "18 de octubre de 2026");
        assert_eq!(spanish_date(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()), "5 de enero de 2025");
        assert_eq!(short_date(Some(date)), "18/10/2026");
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("Junta de Acción Comunal del barrio La Esperanza", 120.0, 10.0, false);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0, false) <= 120.0);
        }
        assert_eq!(lines.join(" "), "Junta de Acción Comunal del barrio La Esperanza");
    }

    #[test]
    fn splits_words_longer_than_a_line() {
        let lines = wrap_text("ABCDEFGHIJKLMNOPQRSTUVWXYZ", 40.0, 10.0, true);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[test]
    fn keeps_explicit_line_breaks() {
        assert_eq!(wrap_text("uno\ndos", 500.0, 10.0, false), vec!["uno", "dos"]);
        assert_eq!(wrap_text("", 500.0, 10.0, false), vec![""]);
    }
}
