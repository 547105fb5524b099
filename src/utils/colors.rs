/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";

use crate::models::attendance::AttendanceStatus;

pub fn color_for_status(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Present => GREEN,
        AttendanceStatus::Absent => RED,
        AttendanceStatus::Late => YELLOW,
        AttendanceStatus::Excused => BLUE,
    }
}

/// Red below the threshold, green otherwise; grey when nothing was recorded.
pub fn color_for_rate(rate: f64, threshold: f64, total: u32) -> &'static str {
    if total == 0 {
        GREY
    } else if rate < threshold {
        RED
    } else {
        GREEN
    }
}

/// Grey placeholder for empty optional fields.
pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--{RESET}"),
    }
}
