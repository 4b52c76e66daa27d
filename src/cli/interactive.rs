//! Interactive configuration using dialoguer.

use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::types::config::{Config, StoreBackend};
use crate::BotResult;

/// Runs the interactive configuration menu.
pub fn run_interactive_config(config_path: &Path) -> BotResult<()> {
    let theme = ColorfulTheme::default();

    println!("\nParley configuration\n");

    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Creating a new configuration...\n");
        Config::default_config()
    };

    loop {
        let options = [
            "General",
            "Bot (wake words, admin)",
            "Knowledge store",
            "Save and exit",
            "Exit without saving",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What do you want to configure?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_bot(&theme, &mut config)?,
            2 => configure_store(&theme, &mut config)?,
            3 => {
                config.save(config_path)?;
                println!("\nConfiguration saved to: {}\n", config_path.display());
                break;
            }
            4 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Discard changes?")
                    .default(false)
                    .interact()?
                {
                    println!("\nExiting without saving.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> BotResult<()> {
    let log_levels = ["error", "warn", "info", "debug", "trace"];
    let current = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let idx = Select::with_theme(theme)
        .with_prompt("Log level")
        .items(&log_levels)
        .default(current)
        .interact()?;
    config.general.log_level = log_levels[idx].to_string();

    let log_formats = ["text", "json"];
    let current = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let idx = Select::with_theme(theme)
        .with_prompt("Log format")
        .items(&log_formats)
        .default(current)
        .interact()?;
    config.general.log_format = log_formats[idx].to_string();

    println!("\nGeneral settings updated.\n");
    Ok(())
}

fn configure_bot(theme: &ColorfulTheme, config: &mut Config) -> BotResult<()> {
    let words: String = Input::with_theme(theme)
        .with_prompt("Wake words (comma separated)")
        .default(config.bot.wake_words.join(", "))
        .interact_text()?;
    config.bot.wake_words = parse_wake_words(&words);

    let current_admin = config
        .bot
        .admin_id
        .map(|id| id.to_string())
        .unwrap_or_default();
    let admin: String = Input::with_theme(theme)
        .with_prompt("Admin user id (empty disables /keys and /stats)")
        .default(current_admin)
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() || input.trim().parse::<i64>().is_ok() {
                Ok(())
            } else {
                Err("expected a numeric user id")
            }
        })
        .interact_text()?;
    config.bot.admin_id = admin.trim().parse().ok();

    println!("\nBot settings updated.\n");
    Ok(())
}

fn configure_store(theme: &ColorfulTheme, config: &mut Config) -> BotResult<()> {
    let backends = ["sqlite", "memory"];
    let current = match config.store.backend {
        StoreBackend::Sqlite => 0,
        StoreBackend::Memory => 1,
    };

    let idx = Select::with_theme(theme)
        .with_prompt("Backend (memory forgets everything on exit)")
        .items(&backends)
        .default(current)
        .interact()?;
    config.store.backend = if idx == 0 {
        StoreBackend::Sqlite
    } else {
        StoreBackend::Memory
    };

    if config.store.backend == StoreBackend::Sqlite {
        let path: String = Input::with_theme(theme)
            .with_prompt("Database path")
            .default(config.store.db_path.display().to_string())
            .interact_text()?;
        config.store.db_path = path.into();
    }

    println!("\nStore settings updated.\n");
    Ok(())
}

fn parse_wake_words(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Prints a configuration summary.
pub fn show_config_summary(config: &Config) {
    let admin = config
        .bot
        .admin_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());
    let backend = match config.store.backend {
        StoreBackend::Sqlite => format!("sqlite ({})", config.store.db_path.display()),
        StoreBackend::Memory => "memory".to_string(),
    };

    println!();
    println!("┌─────────────────────────────────────────┐");
    println!("│ Parley configuration                    │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Log level: {:<28} │", config.general.log_level);
    println!("│ Log format: {:<27} │", config.general.log_format);
    println!("├─────────────────────────────────────────┤");
    println!("│ Wake words: {:<27} │", config.bot.wake_words.join(", "));
    println!("│ Admin: {:<32} │", admin);
    println!("├─────────────────────────────────────────┤");
    println!("│ Store: {:<32} │", backend);
    println!("└─────────────────────────────────────────┘");
    println!();
}
