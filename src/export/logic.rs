use crate::core::auth::require_role;
use crate::core::{directory, tenancy};
use crate::errors::{AppError, AppResult};
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::AttendanceExport;
use crate::export::pdf::export_pdf;
use crate::export::xlsx::export_xlsx;
use crate::export::ExportFormat;
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::ui::messages::{info, warning};
use crate::utils::date::parse_range;
use crate::utils::path::confirm_overwrite;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};
use std::path::Path;

pub struct ExportRequest<'a> {
    pub format: ExportFormat,
    pub file: &'a str,
    /// `None`, `"all"`, or a period / range accepted by `parse_range`.
    pub range: Option<&'a str>,
    pub class_id: Option<i64>,
    pub force: bool,
}

pub struct ExportLogic;

impl ExportLogic {
    /// Export attendance visible to `user`. Returns the number of records
    /// written; nothing is written when the selection is empty.
    pub fn export(conn: &Connection, user: &Profile, req: &ExportRequest) -> AppResult<usize> {
        require_role(user, &[Role::Admin, Role::Teacher, Role::Ministry])?;

        let path = Path::new(req.file);
        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {}",
                req.file
            )));
        }

        let bounds = match req.range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };

        // classes the user may export; None = whole scope
        let allowed: Option<Vec<i64>> = match (req.class_id, user.role) {
            (Some(id), _) => {
                let class = tenancy::load_class(conn, user, id)?;
                if user.is(Role::Teacher) && !tenancy::teaches(conn, user, &class)? {
                    return Err(AppError::Forbidden(format!(
                        "you do not teach class '{}'",
                        class.name
                    )));
                }
                Some(vec![class.id])
            }
            (None, Role::Teacher) => Some(
                directory::classes_for(conn, user)?
                    .iter()
                    .map(|c| c.id)
                    .collect(),
            ),
            (None, _) => None,
        };

        let mut records = load_records(conn, tenancy::scope(user), bounds)?;
        if let Some(ids) = &allowed {
            records.retain(|r| ids.contains(&r.class_id));
        }

        if records.is_empty() {
            warning("No attendance records found for the selected range.");
            return Ok(0);
        }

        if !confirm_overwrite(path, req.force)? {
            info("Export cancelled: existing file not overwritten.");
            return Ok(0);
        }

        match req.format {
            ExportFormat::Csv => export_csv(&records, path)?,
            ExportFormat::Json => export_json(&records, path)?,
            ExportFormat::Xlsx => export_xlsx(&records, path)?,
            ExportFormat::Pdf => export_pdf(&records, path, &build_pdf_title(req.range))?,
        }

        crate::db::log::audit(
            conn,
            "export",
            req.format.as_str(),
            &format!("{} record(s) to {}", records.len(), path.display()),
        );
        Ok(records.len())
    }
}

fn build_pdf_title(range: Option<&str>) -> String {
    match range {
        None => "Attendance records".to_string(),
        Some(r) if r.eq_ignore_ascii_case("all") => "Attendance records".to_string(),
        Some(r) => match r.split_once(':') {
            Some((a, b)) => format!("Attendance from {} to {}", a.trim(), b.trim()),
            None => format!("Attendance for {}", r.trim()),
        },
    }
}

fn load_records(
    conn: &Connection,
    school_id: Option<i64>,
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> AppResult<Vec<AttendanceExport>> {
    let mut sql = String::from(
        "SELECT a.class_id, a.date, s.name, c.name, st.full_name,
                COALESCE(st.student_id_number, ''), a.status,
                COALESCE(a.check_in_time, ''), COALESCE(a.notes, ''),
                COALESCE(p.full_name, '')
         FROM attendance a
         JOIN students st ON st.id = a.student_id
         JOIN classes c   ON c.id = a.class_id
         JOIN schools s   ON s.id = c.school_id
         LEFT JOIN profiles p ON p.id = a.marked_by
         WHERE 1 = 1",
    );
    let mut params: Vec<Value> = Vec::new();

    if let Some(id) = school_id {
        params.push(Value::Integer(id));
        sql.push_str(&format!(" AND c.school_id = ?{}", params.len()));
    }
    if let Some((start, end)) = bounds {
        params.push(Value::Text(start.format("%Y-%m-%d").to_string()));
        sql.push_str(&format!(" AND a.date >= ?{}", params.len()));
        params.push(Value::Text(end.format("%Y-%m-%d").to_string()));
        sql.push_str(&format!(" AND a.date <= ?{}", params.len()));
    }
    sql.push_str(" ORDER BY a.date ASC, s.name ASC, c.name ASC, st.full_name ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<AttendanceExport> {
    Ok(AttendanceExport {
        class_id: row.get(0)?,
        date: row.get(1)?,
        school: row.get(2)?,
        class: row.get(3)?,
        student: row.get(4)?,
        student_number: row.get(5)?,
        status: row.get(6)?,
        check_in_time: row.get(7)?,
        notes: row.get(8)?,
        marked_by: row.get(9)?,
    })
}
