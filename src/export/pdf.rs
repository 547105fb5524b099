//! Minimal multi-page table renderer on top of `pdf-writer`.
//!
//! Uses the built-in Helvetica font, so text is limited to Latin-1; other
//! characters are replaced with `?`.

use crate::errors::{AppError, AppResult};
use crate::export::model::{get_headers, records_to_table};
use crate::export::{AttendanceExport, notify_export_success};
use crate::ui::messages::info;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs;
use std::path::Path;

// A4 landscape, points
const PAGE_W: f32 = 842.0;
const PAGE_H: f32 = 595.0;
const MARGIN: f32 = 36.0;
const ROW_H: f32 = 18.0;
const FONT_SIZE: f32 = 8.5;
const HEADER_FONT_SIZE: f32 = 9.5;
const TITLE_FONT_SIZE: f32 = 14.0;
// rough Helvetica advance per character at FONT_SIZE
const CHAR_W: f32 = 4.8;

pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,
}

impl Default for PdfManager {
    fn default() -> Self {
        Self::new()
    }
}

fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

/// Cut `text` so it fits `width` points, ending with `..` when shortened.
fn fit(text: &str, width: f32) -> String {
    let max = ((width - 8.0) / CHAR_W).floor().max(1.0) as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max.saturating_sub(2)).collect();
    s.push_str("..");
    s
}

impl PdfManager {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            page_refs: Vec::new(),
            next_id: 4,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn text(content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        content.begin_text();
        content.set_font(Name(b"F1"), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&latin1(text)));
        content.end_text();
    }

    fn fill_band(content: &mut Content, y: f32, width: f32, rgb: (f32, f32, f32)) {
        content.save_state();
        content.set_fill_rgb(rgb.0, rgb.1, rgb.2);
        content.rect(MARGIN, y, width, ROW_H);
        content.fill_nonzero();
        content.restore_state();
    }

    fn row(content: &mut Content, y: f32, widths: &[f32], cells: &[String], size: f32) {
        let mut x = MARGIN;
        content.save_state();
        content.set_stroke_rgb(0.65, 0.65, 0.65);
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            Self::text(content, x + 4.0, y + 5.5, size, &fit(cell, *w));
            content.rect(x, y, *w, ROW_H);
            x += w;
        }
        content.stroke();
        content.restore_state();
    }

    fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
        let mut chars: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate().take(chars.len()) {
                chars[i] = chars[i].max(cell.chars().count().min(40));
            }
        }
        let mut widths: Vec<f32> = chars.iter().map(|c| *c as f32 * CHAR_W + 10.0).collect();

        let total: f32 = widths.iter().sum();
        let max = PAGE_W - 2.0 * MARGIN;
        if total > max {
            let scale = max / total;
            for w in &mut widths {
                *w *= scale;
            }
        }
        widths
    }

    fn start_page(&mut self) -> Ref {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
            .contents(content_id);
        page.resources().fonts().pair(Name(b"F1"), self.font_id);
        content_id
    }

    /// Title, subtitle and a paginated table; an empty table still yields one
    /// page with the header row.
    pub fn write_table(
        &mut self,
        title: &str,
        subtitle: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) {
        let widths = Self::column_widths(headers, rows);
        let table_w: f32 = widths.iter().sum();
        let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();

        let mut remaining: &[Vec<String>] = rows;
        let mut page_no = 1;
        loop {
            let content_id = self.start_page();
            let mut content = Content::new();

            Self::text(&mut content, MARGIN, PAGE_H - MARGIN, TITLE_FONT_SIZE, title);
            Self::text(&mut content, MARGIN, PAGE_H - MARGIN - 16.0, FONT_SIZE, subtitle);
            Self::text(
                &mut content,
                PAGE_W - MARGIN - 50.0,
                MARGIN - 20.0,
                FONT_SIZE,
                &format!("Page {page_no}"),
            );

            let mut y = PAGE_H - MARGIN - 44.0;
            Self::fill_band(&mut content, y, table_w, (0.85, 0.87, 0.90));
            Self::row(&mut content, y, &widths, &header_row, HEADER_FONT_SIZE);
            y -= ROW_H;

            let mut consumed = 0;
            for (i, row) in remaining.iter().enumerate() {
                if y < MARGIN {
                    break;
                }
                if i % 2 == 0 {
                    Self::fill_band(&mut content, y, table_w, (0.96, 0.96, 0.96));
                }
                Self::row(&mut content, y, &widths, row, FONT_SIZE);
                y -= ROW_H;
                consumed += 1;
            }

            self.pdf.stream(content_id, &content.finish());
            remaining = &remaining[consumed..];
            page_no += 1;
            if remaining.is_empty() {
                break;
            }
        }
    }

    pub fn save(mut self, path: &Path) -> std::io::Result<()> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        let count = self.page_refs.len() as i32;
        self.pdf
            .pages(self.pages_id)
            .count(count)
            .kids(self.page_refs.iter().copied());
        fs::write(path, self.pdf.finish())
    }
}

pub(crate) fn export_pdf(records: &[AttendanceExport], path: &Path, title: &str) -> AppResult<()> {
    info(format!("Exporting to PDF: {}", path.display()));

    let subtitle = format!(
        "{} record(s), generated {}",
        records.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );

    let mut pdf = PdfManager::new();
    pdf.write_table(title, &subtitle, &get_headers(), &records_to_table(records));
    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success("PDF", records.len(), path);
    Ok(())
}
