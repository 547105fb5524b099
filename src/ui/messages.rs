//! Console output helpers. Everything the CLI tells the user goes through
//! these so icons and colours stay consistent.

use std::fmt;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_BLUE, BOLD, ICON_INFO, RESET, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_GREEN, BOLD, ICON_OK, RESET, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", FG_YELLOW, BOLD, ICON_WARN, RESET, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}{}{} {}{}", FG_RED, BOLD, ICON_ERR, RESET, msg);
}

/// Section title followed by a rule of `sep` characters.
pub fn header<T: fmt::Display>(msg: T, sep: &str) {
    let title = msg.to_string();
    let width = unicode_width::UnicodeWidthStr::width(title.as_str()).max(20);
    println!("\n{}{}{}{}", FG_BLUE, BOLD, title, RESET);
    println!("{}{}{}", DIM, sep.repeat(width), RESET);
}

/// Secondary line, e.g. a hint under a result.
pub fn hint<T: fmt::Display>(msg: T) {
    println!("{}   {}{}", DIM, msg, RESET);
}
