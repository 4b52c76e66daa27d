//! Parley CLI command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dialoguer::{theme::ColorfulTheme, Input};

use crate::bot::Bot;
use crate::gateway::{BotServer, StdioTransport};
use crate::store::{self, KnowledgeExport};
use crate::types::config::{Config, StoreConfig};
use crate::types::InboundEvent;
use crate::BotResult;

/// What `init` did to the target's `.gitignore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IgnoreUpdate {
    Created,
    Appended,
    AlreadyIgnored,
}

const DATA_DIR_ENTRY: &str = ".parley/";

/// Creates `parley.toml` and the knowledge store under `path`.
///
/// `wake_words` replaces the default group wake words when non-empty.
pub async fn init(
    path: Option<PathBuf>,
    admin_id: Option<i64>,
    wake_words: Vec<String>,
) -> BotResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&target_dir)?;

    let config_path = target_dir.join("parley.toml");
    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'parley config' to modify.");
        return Ok(());
    }

    let config = initial_config(admin_id, wake_words);

    // Paths in the config are relative to the directory parley runs from.
    let store_config = StoreConfig {
        db_path: target_dir.join(&config.store.db_path),
        ..config.store.clone()
    };
    let store = store::open(&store_config)?;
    std::fs::create_dir_all(target_dir.join(DATA_DIR_ENTRY))?;
    tracing::info!(backend = store.name(), "Knowledge store ready");

    config.save(&config_path)?;

    match ignore_data_dir(&target_dir)? {
        IgnoreUpdate::Created => println!(".gitignore created with {}", DATA_DIR_ENTRY),
        IgnoreUpdate::Appended => println!(".gitignore updated with {}", DATA_DIR_ENTRY),
        IgnoreUpdate::AlreadyIgnored => {}
    }

    println!("Parley initialized in {}", target_dir.display());
    println!("  config:     {}", config_path.display());
    println!("  store:      {} ({})", store.name(), store_config.db_path.display());
    println!("  wake words: {}", config.bot.wake_words.join(", "));
    match config.bot.admin_id {
        Some(id) => println!("  admin:      {}", id),
        None => println!("  admin:      none (/keys and /stats disabled)"),
    }
    println!();
    println!("Teach it something with 'parley chat', or pipe events into 'parley serve'.");

    Ok(())
}

fn initial_config(admin_id: Option<i64>, wake_words: Vec<String>) -> Config {
    let mut config = Config::default_config();
    let wake_words: Vec<String> = wake_words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect();
    if !wake_words.is_empty() {
        config.bot.wake_words = wake_words;
    }
    config.bot.admin_id = admin_id;
    config
}

/// Makes sure the data directory is listed in `dir/.gitignore`.
fn ignore_data_dir(dir: &Path) -> BotResult<IgnoreUpdate> {
    let gitignore_path = dir.join(".gitignore");
    let block = format!("# parley knowledge store\n{}\n", DATA_DIR_ENTRY);

    let existing = match std::fs::read_to_string(&gitignore_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::write(&gitignore_path, block)?;
            return Ok(IgnoreUpdate::Created);
        }
        Err(e) => return Err(e.into()),
    };

    let data_dir = DATA_DIR_ENTRY.trim_end_matches('/');
    if existing
        .lines()
        .map(|line| line.trim().trim_start_matches('/').trim_end_matches('/'))
        .any(|line| line == data_dir)
    {
        tracing::debug!(".gitignore already covers the data directory");
        return Ok(IgnoreUpdate::AlreadyIgnored);
    }

    let separator = if existing.is_empty() || existing.ends_with("\n\n") {
        ""
    } else if existing.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };
    std::fs::write(&gitignore_path, format!("{}{}{}", existing, separator, block))?;
    Ok(IgnoreUpdate::Appended)
}

/// Runs the gateway on stdin/stdout.
pub async fn serve(config: &Config) -> BotResult<()> {
    let store = store::open(&config.store)?;
    tracing::debug!(
        backend = store.name(),
        wake_words = ?config.bot.wake_words,
        admin = config.bot.admin_id.is_some(),
        "Configuration loaded"
    );

    let bot = Arc::new(Bot::new(store, &config.bot));
    let mut server = BotServer::new(StdioTransport::stdio(), bot);
    server.run().await?;
    Ok(())
}

/// One line typed into `parley chat`.
#[derive(Debug, PartialEq, Eq)]
enum ChatLine {
    Quit,
    Skip,
    Event(InboundEvent),
}

fn parse_chat_line(chat_id: i64, line: &str) -> ChatLine {
    let line = line.trim();
    if line.is_empty() {
        return ChatLine::Skip;
    }

    match line.strip_prefix('/') {
        Some("quit") | Some("exit") => ChatLine::Quit,
        Some(name) => ChatLine::Event(InboundEvent::command(chat_id, name)),
        None => ChatLine::Event(InboundEvent::private(chat_id, line)),
    }
}

/// Talks to the bot as a private conversation on the terminal.
pub async fn chat(chat_id: i64, config: &Config) -> BotResult<()> {
    let store = store::open(&config.store)?;
    let bot = Bot::new(store, &config.bot);
    let theme = ColorfulTheme::default();

    println!("Private conversation {} ({} store).", chat_id, bot.store().name());
    println!("Commands: /start /learn /forget /cancel /keys /stats, /quit to leave.\n");

    loop {
        let line: String = Input::with_theme(&theme)
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;

        let event = match parse_chat_line(chat_id, &line) {
            ChatLine::Quit => break,
            ChatLine::Skip => continue,
            ChatLine::Event(event) => event,
        };

        match bot.handle(event).await {
            Some(reply) => println!("bot: {}", reply.text),
            None => tracing::debug!("No reply"),
        }
    }

    Ok(())
}

/// Prints every learned key.
pub async fn keys(config: &Config) -> BotResult<()> {
    let store = store::open(&config.store)?;
    let keys = store.keys().await?;

    if keys.is_empty() {
        println!("Nothing learned yet.");
        return Ok(());
    }

    for key in &keys {
        println!("{}", key);
    }
    println!("\n{} keys ({} store)", keys.len(), store.name());

    Ok(())
}

/// Writes the knowledge store to `output`.
pub async fn export_knowledge(output: &Path, config: &Config) -> BotResult<()> {
    let store = store::open(&config.store)?;
    let export = KnowledgeExport::collect(store.as_ref()).await?;
    export.save(output)?;

    println!(
        "Exported {} entries to: {}",
        export.entries.len(),
        output.display()
    );
    Ok(())
}

/// Loads a knowledge export and writes it into the store.
pub async fn import_knowledge(input: &Path, config: &Config) -> BotResult<()> {
    if !input.exists() {
        println!("File not found: {}", input.display());
        return Ok(());
    }

    let export = KnowledgeExport::load(input)?;
    let store = store::open(&config.store)?;
    let result = export.apply(store.as_ref()).await?;

    println!("Import finished:");
    println!("  New keys: {}", result.imported);
    println!("  Overwritten: {}", result.overwritten);
    println!("  Skipped (invalid patterns): {}", result.skipped);

    Ok(())
}

/// Edits the configuration interactively.
pub async fn config_cmd(config_path: &Path) -> BotResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Prints the version.
pub fn version() {
    println!("parley {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("A chat bot you teach by talking to it");
}
