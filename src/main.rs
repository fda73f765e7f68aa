use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use reelswipe::app::{App, AppEvent};
use reelswipe::cli::{Args, CommandRunner};
use reelswipe::config::Config;
use reelswipe::storage::{Database, MemoryStore, Storage, StorageError};
use reelswipe::ui;

/// Get the config directory path (~/.config/reelswipe/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("reelswipe"))
}

/// The TUI owns the terminal, so logs go to a file next to the database.
/// Falls back to stderr when the file cannot be opened.
fn init_tracing(config_dir: &Path) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let log_path = config_dir.join("reelswipe.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    // User-only access: the directory holds the auth token
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }
    Ok(())
}

async fn open_storage(args: &Args, config_dir: &Path) -> Result<Storage> {
    if args.ephemeral {
        tracing::info!("Using in-memory storage");
        return Ok(Storage::new(Arc::new(MemoryStore::new())));
    }

    let db_path = config_dir.join("reelswipe.db");
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    match Database::open(db_path_str).await {
        Ok(db) => Ok(Storage::new(Arc::new(db))),
        Err(StorageError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of reelswipe appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => Err(anyhow::anyhow!("Failed to open database: {}", e)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;
    init_tracing(&config_dir);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let storage = open_storage(&args, &config_dir).await?;

    if let Some(command) = args.command {
        let mut runner = CommandRunner::open(&config, storage).await?;
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = runner.run(command, &mut stdout).await {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let mut app = App::init(&config, storage, event_tx.clone())
        .await
        .context("Failed to start")?;

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
