//! Slash command parser for the interactive studio
//!
//! Every line that starts with `/` is a studio command; anything else
//! replaces the prompt text. Command names are case-insensitive, their
//! arguments keep the case they were typed with.

use thiserror::Error;

/// Errors that can occur when parsing studio commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Comando desconhecido: {0}\n\nDigite '/help' para ver os comandos disponíveis")]
    UnknownCommand(String),

    /// Command was given an argument it cannot use
    #[error("Argumento inválido para {command}: {arg}\n\nDigite '/help' para ver o uso correto")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("O comando {command} exige um argumento\n\nUso: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands available in the studio loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioCommand {
    /// Open a template by id
    Open(u32),

    /// List the catalog grouped by category
    Templates,

    /// List context options
    Contexts,

    /// Select a context option by id
    SelectContext(String),

    /// Replace the prompt text
    SetPrompt(String),

    /// Show the current session
    Show,

    /// Stream text for the current prompt
    Generate,

    /// Start an illustration in the background
    Image,

    /// Save the current result as `.txt`
    SaveResult,

    /// Save the current illustration as `.png`
    SaveImage,

    /// List the history log
    History,

    /// Search the history log
    Search(String),

    /// Restore the n-th (1-based) entry of the last listing
    Restore(usize),

    /// Export the full history, or the entries matching a query
    Export(Option<String>),

    /// Clear the history after confirmation
    Clear,

    /// Display help information
    Help,

    /// Leave the studio
    Exit,

    /// Not a command: the input is the new prompt text
    None,
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

/// Parse one line of user input
///
/// # Errors
///
/// Returns `CommandError` for unknown commands, missing arguments and
/// arguments that cannot be parsed.
///
/// # Examples
///
/// ```
/// use educador_ia::commands::special_commands::{parse_special_command, StudioCommand};
///
/// assert_eq!(parse_special_command("/open 7").unwrap(), StudioCommand::Open(7));
/// assert_eq!(
///     parse_special_command("/Search Frações").unwrap(),
///     StudioCommand::Search("Frações".to_string())
/// );
/// assert_eq!(parse_special_command("Uma aula sobre o Sol").unwrap(), StudioCommand::None);
/// assert!(parse_special_command("/voar").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<StudioCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" && lower != "sair" {
        return Ok(StudioCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/open" | "/abrir" => {
            if arg.is_empty() {
                return Err(missing("/open", "/open <id>"));
            }
            arg.parse()
                .map(StudioCommand::Open)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/open".to_string(),
                    arg: arg.to_string(),
                })
        }
        "/templates" | "/modelos" => Ok(StudioCommand::Templates),
        "/contexts" | "/contextos" => Ok(StudioCommand::Contexts),
        "/context" | "/contexto" => {
            if arg.is_empty() {
                Err(missing("/context", "/context <id>"))
            } else {
                Ok(StudioCommand::SelectContext(arg.to_lowercase()))
            }
        }
        "/prompt" => {
            if arg.is_empty() {
                Err(missing("/prompt", "/prompt <texto>"))
            } else {
                Ok(StudioCommand::SetPrompt(arg.to_string()))
            }
        }
        "/show" | "/status" => Ok(StudioCommand::Show),
        "/generate" | "/gerar" => Ok(StudioCommand::Generate),
        "/image" | "/imagem" => Ok(StudioCommand::Image),
        "/save" | "/salvar" => Ok(StudioCommand::SaveResult),
        "/save-image" | "/salvar-imagem" => Ok(StudioCommand::SaveImage),
        "/history" | "/historico" => Ok(StudioCommand::History),
        "/search" | "/buscar" => {
            if arg.is_empty() {
                Err(missing("/search", "/search <termo>"))
            } else {
                Ok(StudioCommand::Search(arg.to_string()))
            }
        }
        "/restore" | "/restaurar" => {
            if arg.is_empty() {
                return Err(missing("/restore", "/restore <n>"));
            }
            match arg.parse::<usize>() {
                Ok(n) if n > 0 => Ok(StudioCommand::Restore(n)),
                _ => Err(CommandError::UnsupportedArgument {
                    command: "/restore".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }
        "/export" | "/exportar" => Ok(StudioCommand::Export(
            (!arg.is_empty()).then(|| arg.to_string()),
        )),
        "/clear" | "/limpar" => Ok(StudioCommand::Clear),
        "/help" | "/ajuda" | "/?" => Ok(StudioCommand::Help),
        "exit" | "quit" | "sair" | "/exit" | "/quit" | "/sair" => Ok(StudioCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for studio commands
pub fn print_help() {
    println!(
        r#"
Comandos do Estúdio
===================

MODELOS:
  /templates          - Lista os modelos por categoria
  /open <id>          - Abre um modelo (o prompt padrão é carregado)

CONTEXTO CURRICULAR:
  /contexts           - Lista os contextos disponíveis
  /context <id>       - Seleciona um contexto (ex: default, municipal)

PROMPT E GERAÇÃO:
  <texto>             - Qualquer linha sem '/' substitui o prompt
  /prompt <texto>     - Mesmo efeito, explícito
  /show               - Mostra o modelo, o prompt e o resultado atuais
  /generate           - Gera o texto (resposta exibida em tempo real)
  /image              - Gera uma ilustração em segundo plano
  /save               - Salva o resultado em .txt
  /save-image         - Salva a ilustração em .png

HISTÓRICO:
  /history            - Lista o histórico (mais recente primeiro)
  /search <termo>     - Filtra por modelo, prompt ou resultado
  /restore <n>        - Restaura o item n da última listagem
  /export [termo]     - Exporta o histórico (ou só o filtrado) em .txt
  /clear              - Apaga todo o histórico (pede confirmação)

OUTROS:
  /help               - Mostra esta ajuda
  /exit               - Sai do estúdio
"#
    );
}
