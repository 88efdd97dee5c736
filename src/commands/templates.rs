//! Catalog listings

use crate::catalog::{Catalog, ContextOption};
use crate::commands::history::preview;
use colored::Colorize;
use prettytable::{format, Table};

/// Print every template grouped by category
pub fn print_catalog(catalog: &Catalog) {
    for (category, templates) in catalog.by_category() {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);

        for template in templates {
            table.add_row(prettytable::row![
                template.id.to_string().cyan(),
                template.title.bold(),
                preview(&template.description, 60)
            ]);
        }

        println!("\n{}", category.label().bold().underline());
        table.printstd();
    }
    println!();
    println!("Use {} para abrir um modelo.", "/open <id>".cyan());
    println!();
}

/// Print context options, marking the selected one
pub fn print_contexts(contexts: &[ContextOption], selected_id: &str) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "".bold(),
        "ID".bold(),
        "Contexto".bold(),
        "Descrição".bold()
    ]);

    for context in contexts {
        let marker = if context.id == selected_id { "*" } else { "" };
        table.add_row(prettytable::row![
            marker.green(),
            context.id.cyan(),
            context.label,
            preview(&context.description, 50)
        ]);
    }

    table.printstd();
    for context in contexts {
        if let Some(link) = &context.link {
            println!("{} {}", format!("{}:", context.id).dimmed(), link);
        }
    }
    println!();
}
