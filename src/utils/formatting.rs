//! Formatting utilities used for CLI and export outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// `87.5%`
pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate)
}

/// Text progress bar, e.g. `[######----] 3/5`.
pub fn progress_bar(done: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return format!("[{}] 0/0", "-".repeat(width));
    }
    let filled = (done * width) / total;
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        done,
        total
    )
}

/// Local date-time of an RFC 3339 stamp, as `YYYY-MM-DD HH:MM`.
pub fn short_stamp(rfc3339: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|_| rfc3339.to_string())
}
