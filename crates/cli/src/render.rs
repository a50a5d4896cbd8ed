//! Human-readable record output.
//!
//! Each record is printed as `attribute : value` lines, names padded to a
//! common display width so Hangul/CJK attribute names line up, followed by
//! the attributes the record was joined on.

use std::fmt::Write as _;

use reident_linkage::config::DisplayConfig;
use reident_linkage::Record;
use unicode_width::UnicodeWidthStr;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Right-pad `s` with spaces to `width` display columns. Never truncates.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Collapse values longer than `threshold` characters to
/// `head` chars + `…` + `tail` chars. Counts characters, not bytes.
pub(crate) fn collapse_middle(s: &str, display: &DisplayConfig) -> String {
    let count = s.chars().count();
    if count <= display.threshold {
        return s.to_string();
    }
    let head: String = s.chars().take(display.head).collect();
    let tail: String = s.chars().skip(count - display.tail).collect();
    format!("{head}…{tail}")
}

pub(crate) fn render_record(record: &Record, display: &DisplayConfig) -> String {
    let width = record.iter().map(|(name, _)| display_width(name)).max().unwrap_or(0);

    let mut out = String::new();
    for (name, value) in record.iter() {
        let _ = writeln!(out, "{} : {}", pad_right(name, width), collapse_middle(&value.to_string(), display));
    }

    if let Some(from) = &record.joined_from {
        let common: Vec<&str> = record.joined_common_attributes.iter().map(String::as_str).collect();
        let _ = writeln!(
            out,
            "  joined on {} ({}#{} + {}#{})",
            common.join(", "),
            from.total.dataset,
            from.total.index,
            from.additional.dataset,
            from.additional.index,
        );
    }
    out
}

/// Records separated by blank lines, each headed by its 1-based position.
pub(crate) fn render_records<'a, I>(records: I, display: &DisplayConfig) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out = String::new();
    for (i, record) in records.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "[{}]", i + 1);
        out.push_str(&render_record(record, display));
    }
    out
}
