use clap::Parser;
use parley::cli::{Cli, Commands};
use parley::types::config::Config;
use parley::{BotError, BotResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> BotResult<()> {
    let cli = Cli::parse();

    // Configuration first, logging depends on it
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|e| {
            eprintln!("Ignoring invalid configuration {}: {}", cli.config.display(), e);
            Config::default_config()
        })
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let directive = format!("parley={}", log_level)
        .parse()
        .or_else(|_| "parley=info".parse())
        .map_err(|e| BotError::config(format!("invalid log directive: {}", e)))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    // stdout belongs to the gateway; logs always go to stderr
    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init {
            path,
            admin_id,
            wake_words,
        } => {
            parley::cli::commands::init(path, admin_id, wake_words).await?;
        }
        Commands::Serve => {
            parley::cli::commands::serve(&config).await?;
        }
        Commands::Chat { chat_id } => {
            parley::cli::commands::chat(chat_id, &config).await?;
        }
        Commands::Keys => {
            parley::cli::commands::keys(&config).await?;
        }
        Commands::Export { output } => {
            parley::cli::commands::export_knowledge(&output, &config).await?;
        }
        Commands::Import { input } => {
            parley::cli::commands::import_knowledge(&input, &config).await?;
        }
        Commands::Config => {
            parley::cli::commands::config_cmd(&cli.config).await?;
        }
        Commands::Version => {
            parley::cli::commands::version();
        }
    }

    Ok(())
}
