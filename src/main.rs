use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

use radiox::app::{App, AppEvent};
use radiox::config::Config;
use radiox::storage::{Database, StorageError};
use radiox::ui;

/// Get the config directory path (~/.config/radiox/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("radiox");
    Ok(config_dir)
}

/// Create the config directory with user-only access.
fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    // SEC-007: Set directory permissions on Unix (user-only access)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata =
            std::fs::metadata(config_dir).context("Failed to read config directory metadata")?;
        let mut perms = metadata.permissions();
        perms.set_mode(0o700);
        if let Err(e) = std::fs::set_permissions(config_dir, perms) {
            eprintln!(
                "Warning: failed to set permissions on {}: {}",
                config_dir.display(),
                e
            );
        }
    }
    Ok(())
}

/// Route tracing to a log file; the terminal belongs to the UI.
///
/// Filter comes from `RUST_LOG` (e.g. `RUST_LOG=radiox=debug`).
fn init_logging(log_path: &Path) {
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "Warning: logging disabled, cannot open {}: {}",
                log_path.display(),
                e
            );
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[derive(Parser, Debug)]
#[command(
    name = "radiox",
    version,
    about = "Terminal client for the RadioRadioX internet radio station"
)]
struct Args {
    /// Config file (default: ~/.config/radiox/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reset local data (profile and onboarding state)
    #[arg(long)]
    reset_db: bool,

    /// Do not open the live stream
    #[arg(long)]
    skip_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;

    init_logging(&config_dir.join("radiox.log"));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting radiox");

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_path = config_dir.join("radiox.db");

    // Handle --reset-db flag
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        tracing::info!(path = %db_path.display(), "Database reset");
        println!("Local data reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(StorageError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of radiox appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let mut app =
        App::new(db, config, !args.skip_audio).context("Failed to create application")?;
    app.restore().await;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    ui::run(&mut app, event_tx, event_rx).await?;

    tracing::info!("Exiting");
    println!("Goodbye!");
    Ok(())
}
