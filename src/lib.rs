//! Educador IA - pedagogical prompt studio library
//!
//! Provides the generation-and-history core behind the studio: a catalog of
//! prompt templates, curricular context augmentation, a streaming client
//! for the generation service, a locally persisted history log and the
//! session state machine that ties them together.
//!
//! # Architecture
//!
//! - `catalog`: Template and context records, built-in catalog
//! - `context`: Prompt augmentation from the selected context
//! - `generation`: Generation client contract and the Gemini implementation
//! - `storage`: Named-slot persistence (SQLite or in memory)
//! - `history`: History log with search and plain-text export
//! - `session`: Text and image generation state machine
//! - `export`: Files written for results, history and illustrations
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line definition and the interactive studio
//!
//! # Example
//!
//! ```no_run
//! use educador_ia::{Catalog, Config, HistoryStore, Session};
//! use educador_ia::generation::create_client;
//! use educador_ia::storage::MemoryStorage;
//! use std::sync::{Arc, Mutex};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let catalog = Catalog::builtin()?;
//!     let history = HistoryStore::open(Arc::new(MemoryStorage::new()), "history");
//!     let session = Session::new(
//!         create_client(&config.gemini)?,
//!         Arc::new(Mutex::new(history)),
//!         catalog.contexts().to_vec(),
//!     );
//!
//!     session.open_template(catalog.template(1).expect("template 1"));
//!     session.generate_text().await;
//!     println!("{}", session.snapshot().result_text);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod generation;
pub mod history;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use catalog::{Catalog, Category, ContextOption, Template};
pub use config::Config;
pub use error::{EducadorError, Result};
pub use generation::{GeneratedImage, GenerationClient};
pub use history::{Confirmation, HistoryEntry, HistoryStore};
pub use session::{Session, SessionState};
