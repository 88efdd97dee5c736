//! Command-line interface definition for Educador IA
//!
//! The binary is an interactive studio; these flags only pick the
//! configuration, the storage location and the template to open first.

use clap::Parser;
use std::path::PathBuf;

/// Educador IA - pedagogical prompt studio
///
/// Pick a template, adapt the prompt, and stream lesson material and
/// illustrations from the generation service. Past generations are kept in
/// a local history log.
#[derive(Parser, Debug, Clone)]
#[command(name = "educador-ia")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Template id to open when the studio starts
    #[arg(short, long)]
    pub template: Option<u32>,

    /// Override the history database path
    #[arg(long, env = "EDUCADOR_HISTORY_DB")]
    pub storage_path: Option<PathBuf>,

    /// Directory for downloaded `.txt` and `.png` files
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Print the template catalog and exit
    #[arg(long)]
    pub list_templates: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            template: None,
            storage_path: None,
            export_dir: None,
            list_templates: false,
        }
    }
}
