//! File export for results, history and illustrations
//!
//! Each export writes one file into the configured output directory and
//! returns the path that was written.

use crate::error::{EducadorError, Result};
use crate::generation::GeneratedImage;
use crate::history::{render_export, HistoryEntry};
use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used for every saved illustration
pub const IMAGE_FILE_NAME: &str = "ilustracao-educador-ia.png";

/// File name for a saved result: `educador-ia-<slug>-<millis>.txt`
///
/// The slug is the lowercased title with each whitespace run replaced by `-`.
/// Characters that are not allowed in file names (`/ \ : * ? " < > |` and
/// control characters) count as whitespace.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use educador_ia::export::result_file_name;
///
/// let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
/// assert_eq!(
///     result_file_name("Planos de  Aula", at),
///     "educador-ia-planos-de-aula-1700000000123.txt"
/// );
/// ```
pub fn result_file_name(template_title: &str, at: DateTime<Utc>) -> String {
    format!(
        "educador-ia-{}-{}.txt",
        slugify(template_title),
        at.timestamp_millis()
    )
}

/// File name for a history export: `historico-educador-ia-<YYYY-MM-DD>.txt`
pub fn history_file_name(date: chrono::NaiveDate) -> String {
    format!("historico-educador-ia-{}.txt", date.format("%Y-%m-%d"))
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_control() || RESERVED.contains(&c))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

const RESERVED: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Save the current result text
///
/// # Errors
///
/// Returns `EducadorError::Export` if the file cannot be written
pub fn write_result_text(dir: &Path, template_title: &str, result: &str) -> Result<PathBuf> {
    let path = write_file(dir, &result_file_name(template_title, Utc::now()), result.as_bytes())?;
    info!("Saved result to {}", path.display());
    Ok(path)
}

/// Save a history export of `entries` (the full log or a search subset)
///
/// # Errors
///
/// Returns `EducadorError::Export` if the file cannot be written
pub fn write_history(dir: &Path, entries: &[HistoryEntry]) -> Result<PathBuf> {
    let path = write_file(
        dir,
        &history_file_name(Local::now().date_naive()),
        render_export(entries).as_bytes(),
    )?;
    info!(
        "Exported {} history entries to {}",
        entries.len(),
        path.display()
    );
    Ok(path)
}

/// Save an illustration as PNG
///
/// # Errors
///
/// Returns error if the image payload cannot be decoded or the file cannot
/// be written
pub fn write_image_png(dir: &Path, image: &GeneratedImage) -> Result<PathBuf> {
    let png = image.to_png()?;
    let path = write_file(dir, IMAGE_FILE_NAME, &png)?;
    info!("Saved illustration to {}", path.display());
    Ok(path)
}

/// Write `name` directly inside `dir`, creating `dir` if needed
fn write_file(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))
            .map_err(|e| EducadorError::Export(format!("{:#}", e)))?;
    }

    let path = dir.join(name);
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
        .map_err(|e| EducadorError::Export(format!("{:#}", e)))?;
    Ok(path)
}
