use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use rusqlite::Connection;

const OP_WIDTH: usize = 60;

fn strip_ansi(re: &Regex, s: &str) -> String {
    re.replace_all(s, "").into_owned()
}

fn color_for_operation(op: &str) -> Colour {
    match op {
        "migration_applied" => Colour::Purple,
        "backup" | "init" | "db_check" | "db_vacuum" => Colour::Blue,
        "signup" | "signin" | "signout" => Colour::Cyan,
        "attendance_mark" | "attendance_set" | "checkin" => Colour::Green,
        "session_open" | "session_close" => Colour::Yellow,
        "student_del" => Colour::Red,
        other if other.ends_with("_review") => Colour::RGB(255, 153, 51),
        other if other.ends_with("_add") || other.ends_with("_submit") => Colour::Green,
        _ => Colour::White,
    }
}

pub struct LogLogic;

impl LogLogic {
    /// Print the audit trail, oldest first. `limit` keeps only the newest N.
    pub fn print_log(conn: &Connection, limit: Option<usize>) -> AppResult<()> {
        let mut stmt = conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let raw_date: String = row.get(1)?;
            let operation: String = row.get(2)?;
            let target: Option<String> = row.get(3)?;
            let message: String = row.get(4)?;

            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            Ok((id, date, operation, target.unwrap_or_default(), message))
        })?;

        let mut entries = Vec::new();
        for r in rows {
            entries.push(r?);
        }
        if let Some(n) = limit
            && entries.len() > n
        {
            entries.drain(..entries.len() - n);
        }

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let ansi = Regex::new(r"\x1B\[[0-9;]*[mK]")
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        let op_w = entries
            .iter()
            .map(|(_, _, op, target, _)| op.len() + target.len() + 3)
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH);
        let id_w = entries
            .iter()
            .map(|(id, _, _, _, _)| id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries
            .iter()
            .map(|(_, date, _, _, _)| date.len())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for (id, date, operation, target, message) in entries {
            let color = color_for_operation(&operation);

            let plain = if target.is_empty() {
                operation.clone()
            } else {
                format!("{operation} ({target})")
            };
            let plain = if plain.chars().count() > OP_WIDTH {
                let mut s: String = plain.chars().take(OP_WIDTH - 3).collect();
                s.push_str("...");
                s
            } else {
                plain
            };

            // only the operation word is coloured
            let colored = match plain.split_once(' ') {
                Some((op_word, rest)) => format!("{} {}", color.paint(op_word), rest),
                None => color.paint(plain.as_str()).to_string(),
            };
            let visible = strip_ansi(&ansi, &colored).chars().count();
            let padding = " ".repeat(op_w.saturating_sub(visible));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                id,
                date,
                colored,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
