use crate::errors::{AppError, AppResult};
use crate::export::model::{get_headers, record_to_row};
use crate::export::{AttendanceExport, notify_export_success};
use crate::ui::messages::info;
use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const DATE_COL: usize = 0;
const STATUS_COL: usize = 5;
const CHECK_IN_COL: usize = 6;

/// Styled workbook: frozen header, banded rows, coloured status cells and
/// real Excel dates/times.
pub(crate) fn export_xlsx(records: &[AttendanceExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Attendance").map_err(xlsx_err)?;

    let headers = get_headers();
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_err)?;
    }
    worksheet.set_freeze_panes(1, 0).ok();

    let mut col_widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    for (index, record) in records.iter().enumerate() {
        let row = (index + 1) as u32;
        let band = if index % 2 == 0 {
            Color::RGB(0xEAF3FB)
        } else {
            Color::RGB(0xFFFFFF)
        };

        for (col, value) in record_to_row(record).iter().enumerate() {
            write_cell(worksheet, row, col, value, band)?;
            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, (*w).min(60) as f64 + 2.0)
            .map_err(xlsx_err)?;
    }

    let target = path
        .to_str()
        .ok_or_else(|| AppError::Export(format!("invalid path: {}", path.display())))?;
    workbook.save(target).map_err(xlsx_err)?;

    notify_export_success("XLSX", records.len(), path);
    Ok(())
}

fn base_format(bg: Color) -> Format {
    Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin)
}

fn status_color(status: &str) -> Option<Color> {
    match status {
        "present" => Some(Color::RGB(0xC6EFCE)),
        "absent" => Some(Color::RGB(0xFFC7CE)),
        "late" => Some(Color::RGB(0xFFEB9C)),
        "excused" => Some(Color::RGB(0xDDEBF7)),
        _ => None,
    }
}

fn write_cell(ws: &mut Worksheet, row: u32, col: usize, value: &str, band: Color) -> AppResult<()> {
    let c = col as u16;

    if col == DATE_COL
        && let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
    {
        let fmt = base_format(band).set_num_format("yyyy-mm-dd");
        ws.write_with_format(row, c, excel_serial(d), &fmt)
            .map_err(xlsx_err)?;
        return Ok(());
    }

    if col == CHECK_IN_COL
        && let Ok(t) = NaiveTime::parse_from_str(value, "%H:%M:%S")
    {
        let fmt = base_format(band).set_num_format("hh:mm");
        let fraction = f64::from(t.num_seconds_from_midnight()) / 86400.0;
        ws.write_with_format(row, c, fraction, &fmt)
            .map_err(xlsx_err)?;
        return Ok(());
    }

    let bg = if col == STATUS_COL {
        status_color(value).unwrap_or(band)
    } else {
        band
    };
    ws.write_with_format(row, c, value, &base_format(bg))
        .map_err(xlsx_err)?;
    Ok(())
}

/// Days since the Excel epoch (1899-12-30).
fn excel_serial(d: NaiveDate) -> f64 {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .map(|epoch| (d - epoch).num_days() as f64)
        .unwrap_or_default()
}

fn xlsx_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}
