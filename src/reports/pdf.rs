//! PDF output.
//!
//! Writes PDF 1.4 directly with the standard Helvetica fonts in
//! WinAnsiEncoding, which covers Spanish text without embedding fonts.

use super::text::{text_width, wrap_text};
use super::ReportTable;

pub const A4_PORTRAIT: (f64, f64) = (595.0, 842.0);
pub const A4_LANDSCAPE: (f64, f64) = (842.0, 595.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "/F1",
            Font::Bold => "/F2",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Font::Bold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Multi-page drawing surface; coordinates are points from the bottom-left corner
pub struct PdfDocument {
    width: f64,
    height: f64,
    pages: Vec<Vec<u8>>,
    current: usize,
}

impl PdfDocument {
    pub fn new(size: (f64, f64)) -> Self {
        Self {
            width: size.0,
            height: size.1,
            pages: vec![Vec::new()],
            current: 0,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.current = self.pages.len() - 1;
    }

    /// Switch the drawing target to an existing page (zero based)
    pub fn select_page(&mut self, index: usize) {
        if index < self.pages.len() {
            self.current = index;
        }
    }

    fn push(&mut self, op: &str) {
        self.pages[self.current].extend_from_slice(op.as_bytes());
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, font: Font, text: &str) {
        self.push(&format!("BT\n{} {:.1} Tf\n{:.2} {:.2} Td\n(", font.resource(), size, x, y));
        let encoded = encode_win_ansi(text);
        self.pages[self.current].extend_from_slice(&encoded);
        self.push(") Tj\nET\n");
    }

    pub fn aligned_text(&mut self, x: f64, width: f64, y: f64, size: f64, font: Font, align: Align, text: &str) {
        let text_w = text_width(text, size, font.is_bold());
        let left = match align {
            Align::Left => x,
            Align::Center => x + (width - text_w).max(0.0) / 2.0,
            Align::Right => x + (width - text_w).max(0.0),
        };
        self.text(left, y, size, font, text);
    }

    /// Wrap and draw a paragraph; returns the baseline below the last line
    pub fn paragraph(&mut self, x: f64, y: f64, width: f64, size: f64, font: Font, align: Align, text: &str) -> f64 {
        let leading = size * 1.35;
        let mut baseline = y;
        for line in wrap_text(text, width, size, font.is_bold()) {
            self.aligned_text(x, width, baseline, size, font, align, &line);
            baseline -= leading;
        }
        baseline
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, thickness: f64) {
        self.push(&format!(
            "0.4 0.4 0.4 RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\n",
            thickness, x1, y1, x2, y2
        ));
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, gray: f64) {
        self.push(&format!("{:.2} g\n{:.2} {:.2} {:.2} {:.2} re f\n0 g\n", gray, x, y, w, h));
    }

    /// Serialize the document with a cross-reference table
    pub fn finish(self, title: &str) -> Vec<u8> {
        let page_count = self.pages.len();
        // Objects: 1 catalog, 2 pages, 3 regular font, 4 bold font, 5 info,
        // then a (page, content) pair per page
        let first_page_obj = 6;
        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();

        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        offsets.push(out.len());
        out.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", first_page_obj + i * 2)).collect();
        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
                kids.join(" "),
                page_count
            )
            .as_bytes(),
        );

        offsets.push(out.len());
        out.extend_from_slice(
            b"3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj\n",
        );
        offsets.push(out.len());
        out.extend_from_slice(
            b"4 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>\nendobj\n",
        );

        offsets.push(out.len());
        out.extend_from_slice(b"5 0 obj\n<< /Title (");
        out.extend_from_slice(&encode_win_ansi(title));
        out.extend_from_slice(b") /Producer (juntas-api) >>\nendobj\n");

        for (i, content) in self.pages.iter().enumerate() {
            let page_obj = first_page_obj + i * 2;
            offsets.push(out.len());
            out.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.0} {:.0}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>\nendobj\n",
                    page_obj,
                    self.width,
                    self.height,
                    page_obj + 1
                )
                .as_bytes(),
            );

            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n<< /Length {} >>\nstream\n", page_obj + 1, content.len()).as_bytes());
            out.extend_from_slice(content);
            out.extend_from_slice(b"\nendstream\nendobj\n");
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1).as_bytes());
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );

        out
    }
}

/// Map to WinAnsi bytes and escape string delimiters; unmapped characters become '?'
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                c as u8
            }
            '\n' | '\r' | '\t' => b' ',
            c if (c as u32) < 0x20 => continue,
            c if (c as u32) < 0x7F => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        };
        out.push(byte);
    }
    out
}

const MARGIN: f64 = 36.0;
const CELL_PADDING: f64 = 4.0;
const BODY_SIZE: f64 = 8.5;
const HEADER_SIZE: f64 = 9.0;

/// Column widths proportional to content length, scaled to the usable width
fn column_widths(table: &ReportTable, usable: f64) -> Vec<f64> {
    let weights: Vec<f64> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count());
            (longest as f64).clamp(6.0, 40.0)
        })
        .collect();
    let total: f64 = weights.iter().sum::<f64>().max(1.0);
    weights.iter().map(|w| w / total * usable).collect()
}

/// A4 landscape table with wrapped cells, a repeated header row on every page
/// and "Página n de N" footers
pub fn render_table(table: &ReportTable) -> Vec<u8> {
    let mut doc = PdfDocument::new(A4_LANDSCAPE);
    let usable = doc.width() - 2.0 * MARGIN;
    let widths = column_widths(table, usable);
    let leading = BODY_SIZE * 1.3;
    let bottom = MARGIN + 20.0;

    let mut y = doc.height() - MARGIN;
    y = doc.paragraph(MARGIN, y - 14.0, usable, 14.0, Font::Bold, Align::Left, &table.title);
    if let Some(subtitle) = &table.subtitle {
        y = doc.paragraph(MARGIN, y, usable, 9.5, Font::Regular, Align::Left, subtitle);
    }
    y -= 6.0;

    let header_cells: Vec<Vec<String>> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(header, w)| wrap_text(header, w - 2.0 * CELL_PADDING, HEADER_SIZE, true))
        .collect();
    let header_lines = header_cells.iter().map(Vec::len).max().unwrap_or(1);
    let header_height = header_lines as f64 * HEADER_SIZE * 1.3 + 2.0 * CELL_PADDING;

    let draw_header = |doc: &mut PdfDocument, top: f64| -> f64 {
        doc.fill_rect(MARGIN, top - header_height, usable, header_height, 0.88);
        let mut x = MARGIN;
        for (lines, w) in header_cells.iter().zip(&widths) {
            let mut baseline = top - CELL_PADDING - HEADER_SIZE;
            for line in lines {
                doc.text(x + CELL_PADDING, baseline, HEADER_SIZE, Font::Bold, line);
                baseline -= HEADER_SIZE * 1.3;
            }
            x += w;
        }
        top - header_height
    };

    y = draw_header(&mut doc, y);

    if table.rows.is_empty() {
        doc.text(MARGIN + CELL_PADDING, y - CELL_PADDING - BODY_SIZE, BODY_SIZE, Font::Regular, "Sin registros");
    }

    for (row_index, row) in table.rows.iter().enumerate() {
        let cells: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| wrap_text(row.get(i).map(String::as_str).unwrap_or(""), w - 2.0 * CELL_PADDING, BODY_SIZE, false))
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
        let row_height = lines as f64 * leading + 2.0 * CELL_PADDING;

        if y - row_height < bottom {
            doc.add_page();
            let top = doc.height() - MARGIN;
            y = draw_header(&mut doc, top);
        }

        if row_index % 2 == 1 {
            doc.fill_rect(MARGIN, y - row_height, usable, row_height, 0.96);
        }

        let mut x = MARGIN;
        for (lines, w) in cells.iter().zip(&widths) {
            let mut baseline = y - CELL_PADDING - BODY_SIZE;
            for line in lines {
                doc.text(x + CELL_PADDING, baseline, BODY_SIZE, Font::Regular, line);
                baseline -= leading;
            }
            x += w;
        }
        doc.line(MARGIN, y - row_height, MARGIN + usable, y - row_height, 0.3);
        y -= row_height;
    }

    add_page_numbers(&mut doc);
    doc.finish(&table.title)
}

pub fn add_page_numbers(doc: &mut PdfDocument) {
    let total = doc.page_count();
    let width = doc.width();
    for index in 0..total {
        doc.select_page(index);
        doc.aligned_text(
            MARGIN,
            width - 2.0 * MARGIN,
            MARGIN - 12.0,
            8.0,
            Font::Regular,
            Align::Right,
            &format!("Página {} de {}", index + 1, total),
        );
    }
}
