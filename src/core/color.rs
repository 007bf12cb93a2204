// src/core/color.rs

use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// First word of a command line plus the whitespace after it (or end
    /// of line). Lines that start with anything else, e.g. `./script` or
    /// an env assignment, are left alone.
    static ref FIRST_WORD_REGEX: Regex = Regex::new(r"^\w+(\s|$)").unwrap();
}

/// Highlights the leading program word of an echoed command line.
/// `colored` drops the escape codes itself when output is not a terminal.
pub fn colorize_command(line: &str) -> String {
    FIRST_WORD_REGEX
        .replace(line, |caps: &regex::Captures<'_>| {
            caps[0].bright_green().to_string()
        })
        .into_owned()
}
