//! mnemon CLI - Command-line interface for the mnemon memory subsystem.

use clap::Parser;
use mnemon_cli::commands;
use mnemon_cli::{Cli, Command, Formatter, MnemonConfig};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config: an explicit path must parse, the default location
    // falls back to defaults (saved for next time)
    let config = match &cli.config {
        Some(path) => MnemonConfig::load_from(path)?,
        None => MnemonConfig::load().unwrap_or_else(|_| {
            let cfg = MnemonConfig::default();
            cfg.save().ok();
            cfg
        }),
    };
    config.validate()?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    let db_path = config.resolve_db_path(cli.db.as_deref())?;

    // Handle commands
    match cli.command {
        Command::Serve => {
            commands::execute_serve(&config, db_path).await?;
        }
        cmd => {
            let store = commands::open_store(&db_path, &config)?;

            match cmd {
                Command::Store(args) => {
                    commands::execute_store(args, &store, &formatter)?;
                }
                Command::Recall(args) => {
                    commands::execute_recall(args, &store, &formatter)?;
                }
                Command::Get(args) => {
                    commands::execute_get(args, &store, &formatter)?;
                }
                Command::List => {
                    commands::execute_list(&store, &formatter)?;
                }
                Command::Remove(args) => {
                    commands::execute_remove(args, &store, &formatter)?;
                }
                Command::Clear(args) => {
                    commands::execute_clear(args, &store, &formatter)?;
                }
                Command::Count => {
                    commands::execute_count(&store, &formatter)?;
                }
                Command::Stats(args) => {
                    commands::execute_stats(args, &store, &config, &db_path, &formatter)?;
                }
                Command::Prune => {
                    commands::execute_prune(&store, &config, &formatter)?;
                }
                Command::Deduplicate => {
                    commands::execute_deduplicate(&store, &config, &formatter)?;
                }
                Command::Maintenance => {
                    commands::execute_maintenance(&store, &config, &formatter)?;
                }
                Command::Serve => unreachable!(),
            }
        }
    }

    Ok(())
}
