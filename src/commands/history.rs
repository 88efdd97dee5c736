use crate::history::HistoryEntry;
use chrono::Local;
use colored::Colorize;
use prettytable::{format, Table};

/// Shorten `text` to at most `max` characters on one line
pub(crate) fn preview(text: &str, max: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > max {
        let cut: String = single_line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}

/// Print history entries as a numbered table
///
/// The numbers are what `/restore <n>` refers to.
pub fn print_history(entries: &[HistoryEntry], heading: &str) {
    if entries.is_empty() {
        println!("{}", "Nenhum item no histórico.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "Data".bold(),
        "Modelo".bold(),
        "Prompt".bold(),
        "Resultado".bold()
    ]);

    for (index, entry) in entries.iter().enumerate() {
        let when = entry
            .timestamp
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M")
            .to_string();

        table.add_row(prettytable::row![
            (index + 1).to_string().cyan(),
            when,
            preview(&entry.template_title, 30),
            preview(&entry.prompt, 40),
            preview(&entry.result, 40)
        ]);
    }

    println!("\n{}", heading);
    table.printstd();
    println!();
    println!(
        "Use {} para restaurar um item.",
        "/restore <n>".cyan()
    );
    println!();
}
