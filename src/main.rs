//! Educador IA - pedagogical prompt studio
//!
//! Main entry point for the interactive studio.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use educador_ia::cli::Cli;
use educador_ia::commands;
use educador_ia::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let catalog = commands::load_catalog(&config)?;

    if cli.list_templates {
        commands::templates::print_catalog(&catalog);
        return Ok(());
    }

    commands::studio::run_studio(config, catalog, cli.template).await
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so streamed text on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "educador_ia=debug"
    } else {
        "educador_ia=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
