/*!
Command handlers for the CLI

- `studio` - the interactive readline loop (the default mode)
- `templates` - catalog and context listings, also used by `--list-templates`
- `history` - history tables
- `special_commands` - slash command parser
*/

use crate::catalog::Catalog;
use crate::config::{Config, HistoryConfig};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::storage::{MemoryStorage, SlotStorage, SqliteStorage};
use std::sync::Arc;

pub mod history;
pub mod special_commands;
pub mod templates;

/// Open the history store described by `config`
///
/// Falls back to in-memory storage when the database cannot be opened, so
/// the studio keeps working with a history that is not durable.
pub fn open_history_store(config: &HistoryConfig) -> HistoryStore {
    let storage: Arc<dyn SlotStorage> = match open_sqlite(config) {
        Ok(storage) => {
            tracing::info!("History database: {}", storage.path().display());
            Arc::new(storage)
        }
        Err(e) => {
            tracing::warn!("History not durable this session: {:#}", e);
            Arc::new(MemoryStorage::new())
        }
    };
    HistoryStore::open(storage, config.slot.clone())
}

fn open_sqlite(config: &HistoryConfig) -> Result<SqliteStorage> {
    match &config.db_path {
        Some(path) => SqliteStorage::new_with_path(path.clone()),
        None => SqliteStorage::new(),
    }
}

/// Load the configured catalog, or the built-in one
///
/// # Errors
///
/// Returns error if a configured catalog file cannot be read or parsed
pub fn load_catalog(config: &Config) -> Result<Catalog> {
    match &config.catalog.path {
        Some(path) => {
            tracing::info!("Loading catalog from {}", path.display());
            Catalog::load(path)
        }
        None => Catalog::builtin(),
    }
}

// Interactive studio
pub mod studio {
    //! Interactive studio loop.
    //!
    //! Builds the generation client, history store and session, then reads
    //! lines with rustyline. Text and image generation each run on a spawned
    //! task, so the prompt stays available: the user can edit the prompt,
    //! switch context or start the other kind of generation mid-stream.

    use super::*;
    use crate::commands::history::print_history;
    use crate::commands::special_commands::{parse_special_command, print_help, StudioCommand};
    use crate::commands::templates::{print_catalog, print_contexts};
    use crate::export;
    use crate::generation::create_client;
    use crate::history::{Confirmation, HistoryEntry};
    use crate::session::{ImageOutcome, Session, SessionState, SkipReason, TextOutcome};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::io::Write;
    use std::path::Path;
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use tokio::task::JoinHandle;

    /// Start the interactive studio
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `catalog` - Templates and context options
    /// * `initial_template` - Template to open before the first prompt
    ///
    /// # Errors
    ///
    /// Returns error if the generation client or the line editor cannot be
    /// created
    pub async fn run_studio(
        config: Config,
        catalog: Catalog,
        initial_template: Option<u32>,
    ) -> Result<()> {
        tracing::info!("Starting interactive studio");

        let client = create_client(&config.gemini)?;
        let history = Arc::new(Mutex::new(open_history_store(&config.history)));
        let session = Session::new(client, Arc::clone(&history), catalog.contexts().to_vec());

        if let Some(id) = initial_template {
            match catalog.template(id) {
                Some(template) => {
                    session.open_template(template);
                }
                None => println!("{}", format!("Modelo {} não encontrado.", id).yellow()),
            }
        }

        let mut rl = DefaultEditor::new()?;
        let mut last_listing: Vec<HistoryEntry> = Vec::new();
        let export_dir = config.export.output_dir.clone();

        print_welcome_banner();
        if session.snapshot().active_template.is_some() {
            print_session(&session.snapshot());
        }

        loop {
            let prompt = format_prompt(&session.snapshot());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        StudioCommand::Open(id) => match catalog.template(id) {
                            Some(template) => {
                                if !session.open_template(template) {
                                    println!("Modelo já aberto.");
                                }
                                print_session(&session.snapshot());
                            }
                            None => println!("{}", format!("Modelo {} não encontrado.", id).yellow()),
                        },
                        StudioCommand::Templates => print_catalog(&catalog),
                        StudioCommand::Contexts => {
                            print_contexts(catalog.contexts(), &session.snapshot().selected_context_id)
                        }
                        StudioCommand::SelectContext(id) => match catalog.context(&id) {
                            Some(context) => {
                                session.set_context(id.clone());
                                println!("Contexto: {}\n", context.label.green());
                            }
                            None => println!("{}", format!("Contexto '{}' não existe.", id).yellow()),
                        },
                        StudioCommand::SetPrompt(text) => set_prompt(&session, text),
                        StudioCommand::None => set_prompt(&session, trimmed.to_string()),
                        StudioCommand::Show => print_session(&session.snapshot()),
                        StudioCommand::Generate => {
                            spawn_text(&session);
                        }
                        StudioCommand::Image => {
                            spawn_image(&session);
                            println!("Gerando ilustração em segundo plano...\n");
                        }
                        StudioCommand::SaveResult => save_result(&session.snapshot(), &export_dir),
                        StudioCommand::SaveImage => save_image(&session.snapshot(), &export_dir),
                        StudioCommand::History => {
                            last_listing = lock_history(&history).entries().to_vec();
                            print_history(&last_listing, "Histórico:");
                        }
                        StudioCommand::Search(query) => {
                            last_listing = lock_history(&history).search(&query);
                            print_history(&last_listing, &format!("Resultados para '{}':", query));
                        }
                        StudioCommand::Restore(n) => restore(&session, &history, &last_listing, n),
                        StudioCommand::Export(query) => {
                            let entries = {
                                let store = lock_history(&history);
                                match &query {
                                    Some(q) => store.search(q),
                                    None => store.entries().to_vec(),
                                }
                            };
                            match export::write_history(&export_dir, &entries) {
                                Ok(path) => println!(
                                    "{} {}\n",
                                    format!("{} itens exportados para", entries.len()).green(),
                                    path.display()
                                ),
                                Err(e) => eprintln!("{}\n", format!("{:#}", e).red()),
                            }
                        }
                        StudioCommand::Clear => {
                            let answer = rl
                                .readline("Apagar todo o histórico? Esta ação não pode ser desfeita. [s/N] ")
                                .unwrap_or_default();
                            if lock_history(&history).clear(Confirmation::from_answer(&answer)) {
                                last_listing.clear();
                                println!("{}\n", "Histórico apagado.".green());
                            } else {
                                println!("Nada foi apagado.\n");
                            }
                        }
                        StudioCommand::Help => print_help(),
                        StudioCommand::Exit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        session.close();
        println!("Até logo!");
        Ok(())
    }

    fn lock_history(history: &Mutex<HistoryStore>) -> MutexGuard<'_, HistoryStore> {
        history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_prompt(session: &Session, text: String) {
        if session.snapshot().active_template.is_none() {
            println!("{}", "Abra um modelo primeiro (/templates, /open <id>).".yellow());
            return;
        }
        session.set_prompt(text);
        println!("{}\n", "Prompt atualizado.".green());
    }

    /// Part of `text` not yet written by a stream that already printed
    /// `printed` bytes
    ///
    /// Accumulated text always extends what was printed before; anything
    /// else is reprinted whole.
    pub(crate) fn stream_delta(printed: usize, text: &str) -> &str {
        text.get(printed..).unwrap_or(text)
    }

    /// Stream text on a background task, printing each new suffix
    pub(crate) fn spawn_text(session: &Session) -> JoinHandle<TextOutcome> {
        let session = session.clone();
        tokio::spawn(async move {
            let printed = Mutex::new(0usize);
            let print_partial = |text: &str| {
                let mut printed = printed.lock().unwrap_or_else(PoisonError::into_inner);
                if *printed == 0 {
                    println!();
                }
                print!("{}", stream_delta(*printed, text));
                let _ = std::io::stdout().flush();
                *printed = text.len();
            };

            let outcome = session.generate_text_with(Some(&print_partial)).await;

            match &outcome {
                TextOutcome::Completed { saved } => {
                    print_partial(&session.snapshot().result_text);
                    println!("\n");
                    match saved {
                        Some(_) => println!("{}\n", "Resultado salvo no histórico.".green()),
                        None => println!("{}\n", "Resposta vazia; nada foi salvo.".yellow()),
                    }
                }
                TextOutcome::Failed => {
                    println!("\n\n{}\n", session.snapshot().result_text.red());
                }
                TextOutcome::Skipped(reason) => println!("{}", skip_message(*reason).yellow()),
                TextOutcome::Abandoned => {}
            }
            outcome
        })
    }

    /// Generate an illustration on a background task
    pub(crate) fn spawn_image(session: &Session) -> JoinHandle<ImageOutcome> {
        let session = session.clone();
        tokio::spawn(async move {
            let outcome = session.generate_image().await;
            match &outcome {
                ImageOutcome::Completed(_) => println!(
                    "\n{}",
                    "Ilustração pronta. Use /save-image para salvar.".green()
                ),
                ImageOutcome::Skipped(reason) => {
                    println!("\n{}", skip_message(*reason).yellow())
                }
                // Failures are only logged
                ImageOutcome::Failed | ImageOutcome::Abandoned => {}
            }
            outcome
        })
    }

    fn skip_message(reason: SkipReason) -> &'static str {
        match reason {
            SkipReason::NoTemplate => "Abra um modelo primeiro (/templates, /open <id>).",
            SkipReason::EmptyPrompt => "O prompt está vazio.",
            SkipReason::AlreadyRunning => "Já existe uma geração em andamento.",
        }
    }

    fn restore(
        session: &Session,
        history: &Mutex<HistoryStore>,
        listing: &[HistoryEntry],
        n: usize,
    ) {
        let entries = if listing.is_empty() {
            lock_history(history).entries().to_vec()
        } else {
            listing.to_vec()
        };

        let Some(entry) = entries.get(n - 1) else {
            println!("{}", format!("Item {} não existe na última listagem.", n).yellow());
            return;
        };

        if session.snapshot().active_template.is_none() {
            println!("{}", "Abra um modelo primeiro (/templates, /open <id>).".yellow());
            return;
        }

        if session.restore(entry) {
            println!("{}\n", "Item restaurado.".green());
            print_session(&session.snapshot());
        } else {
            println!("{}", "Aguarde o fim da geração para restaurar.".yellow());
        }
    }

    fn save_result(state: &SessionState, dir: &Path) {
        let Some(template) = &state.active_template else {
            println!("{}", "Nenhum modelo aberto.".yellow());
            return;
        };
        if state.result_text.is_empty() || state.generation_in_progress {
            println!("{}", "Nenhum resultado para salvar.".yellow());
            return;
        }

        match export::write_result_text(dir, &template.title, &state.result_text) {
            Ok(path) => println!("{} {}\n", "Resultado salvo em".green(), path.display()),
            Err(e) => eprintln!("{}\n", format!("{:#}", e).red()),
        }
    }

    fn save_image(state: &SessionState, dir: &Path) {
        let Some(image) = &state.generated_image else {
            println!("{}", "Nenhuma ilustração para salvar.".yellow());
            return;
        };

        match export::write_image_png(dir, image) {
            Ok(path) => println!("{} {}\n", "Ilustração salva em".green(), path.display()),
            Err(e) => eprintln!("{}\n", format!("{:#}", e).red()),
        }
    }

    fn format_prompt(state: &SessionState) -> String {
        match &state.active_template {
            Some(template) => format!("educador[{}]> ", template.id),
            None => "educador> ".to_string(),
        }
    }

    fn print_welcome_banner() {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                Educador IA - Estúdio de Prompts              ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Digite '/templates' para ver os modelos e '/help' para os comandos.\n");
    }

    fn print_session(state: &SessionState) {
        let Some(template) = &state.active_template else {
            println!("{}", "Nenhum modelo aberto.".yellow());
            return;
        };

        println!("\n{} {}", format!("[{}]", template.id).cyan(), template.title.bold());
        println!("{}", template.description.dimmed());
        println!("{} {}", "Contexto:".bold(), state.selected_context_id);
        println!("{}\n{}\n", "Prompt:".bold(), state.prompt_text);

        if state.generation_in_progress {
            println!("{}", "(gerando texto...)".dimmed());
        }
        if !state.result_text.is_empty() {
            println!("{}\n{}\n", "Resultado:".bold(), state.result_text);
        }
        if state.image_generation_in_progress {
            println!("{}", "(gerando ilustração...)".dimmed());
        }
        if let Some(image) = &state.generated_image {
            println!("{} {} pronta (/save-image)\n", "Ilustração:".bold(), image.mime_type);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::generation::{GeneratedImage, GenerationClient, PartialSink};
        use crate::storage::MemoryStorage;
        use async_trait::async_trait;
        use tokio::sync::Notify;

        /// Text waits on `gate`; images return at once
        struct GatedClient {
            gate: Arc<Notify>,
        }

        #[async_trait]
        impl GenerationClient for GatedClient {
            async fn stream_text(&self, _prompt: &str, on_partial: PartialSink<'_>) -> Result<String> {
                on_partial("parcial");
                self.gate.notified().await;
                Ok("parcial e final".to_string())
            }

            async fn generate_image(&self, _prompt: &str) -> Result<GeneratedImage> {
                Ok(GeneratedImage::new("image/png", "iVBORw0KGgo="))
            }
        }

        fn gated_session() -> (Session, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            let catalog = Catalog::builtin().unwrap();
            let history = Arc::new(Mutex::new(HistoryStore::open(
                Arc::new(MemoryStorage::new()),
                "history",
            )));
            let session = Session::new(
                Arc::new(GatedClient { gate: gate.clone() }),
                history,
                catalog.contexts().to_vec(),
            );
            session.open_template(catalog.template(1).unwrap());
            (session, gate)
        }

        #[tokio::test]
        async fn test_commands_stay_available_while_text_streams() {
            let (session, gate) = gated_session();

            let text = spawn_text(&session);
            while session.snapshot().result_text != "parcial" {
                tokio::task::yield_now().await;
            }

            assert!(matches!(
                spawn_image(&session).await.unwrap(),
                ImageOutcome::Completed(_)
            ));
            assert_eq!(
                spawn_text(&session).await.unwrap(),
                TextOutcome::Skipped(SkipReason::AlreadyRunning)
            );
            session.set_context("municipal");
            session.set_prompt("novo prompt");

            let state = session.snapshot();
            assert!(state.generation_in_progress);
            assert!(state.generated_image.is_some());
            assert_eq!(state.selected_context_id, "municipal");

            gate.notify_one();
            assert!(matches!(
                text.await.unwrap(),
                TextOutcome::Completed { saved: Some(_) }
            ));
            let state = session.snapshot();
            assert_eq!(state.result_text, "parcial e final");
            assert_eq!(state.prompt_text, "novo prompt");
            assert!(state.generated_image.is_some());
        }

        #[test]
        fn test_stream_delta_prints_only_new_suffix() {
            assert_eq!(stream_delta(0, "Ola"), "Ola");
            assert_eq!(stream_delta(3, "Ola, tudo bem"), ", tudo bem");
            assert_eq!(stream_delta("Ola, tudo bem".len(), "Ola, tudo bem!"), "!");
            assert_eq!(stream_delta(5, "Ola, tudo bem"), "tudo bem");
        }

        #[test]
        fn test_stream_delta_reprints_on_mismatch() {
            // Past the end, or inside a multi-byte character
            assert_eq!(stream_delta(10, "curto"), "curto");
            assert_eq!(stream_delta(2, "ação"), "ação");
        }

        #[test]
        fn test_format_prompt() {
            assert_eq!(format_prompt(&SessionState::default()), "educador> ");
        }

        #[test]
        fn test_skip_messages_are_distinct() {
            let messages = [
                skip_message(SkipReason::NoTemplate),
                skip_message(SkipReason::EmptyPrompt),
                skip_message(SkipReason::AlreadyRunning),
            ];
            assert_ne!(messages[0], messages[1]);
            assert_ne!(messages[1], messages[2]);
        }
    }
}
