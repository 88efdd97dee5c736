//! Plain-text rendering of history entries for export

use crate::history::HistoryEntry;
use chrono::{Local, TimeZone};

/// Separator written after every exported entry
pub const SEPARATOR: &str = "--------------------------------------------------";

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Render entries in the given order, timestamps in the local time zone
pub fn render_export(entries: &[HistoryEntry]) -> String {
    render_export_in(entries, &Local)
}

/// Render entries with timestamps shown in `tz`
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use educador_ia::history::{render_export_in, HistoryEntry};
///
/// let entry = HistoryEntry {
///     id: "01H".into(),
///     template_title: "Rubricas".into(),
///     prompt: "Crie uma rubrica".into(),
///     result: "Rubrica pronta".into(),
///     timestamp: Utc.with_ymd_and_hms(2024, 5, 2, 8, 5, 9).unwrap(),
/// };
/// let text = render_export_in(&[entry], &Utc);
/// assert!(text.starts_with("Data: 02/05/2024 08:05:09\nModelo: Rubricas\n"));
/// ```
pub fn render_export_in<Tz>(entries: &[HistoryEntry], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    for entry in entries {
        let when = entry.timestamp.with_timezone(tz).format(TIMESTAMP_FORMAT);
        out.push_str(&format!("Data: {}\n", when));
        out.push_str(&format!("Modelo: {}\n", entry.template_title));
        out.push_str(&format!("Prompt: {}\n\n", entry.prompt));
        out.push_str(&entry.result);
        out.push('\n');
        out.push_str(SEPARATOR);
        out.push_str("\n\n");
    }
    out
}
