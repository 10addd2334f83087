use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modstrap::config::Paths;
use modstrap::games::{GameDetector, SystemLauncher};
use modstrap::mods::{ModLayout, SettingsStore};
use modstrap::{App, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "modstrap")]
#[command(
    author,
    version,
    about = "Installs and launches a BepInEx-bootstrapped game mod"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Mod folder override for this invocation
    #[arg(long)]
    mod_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show mod, game and install status
    Status,

    /// Hand over the game executable (first file matching the manifest's exe wins)
    Drop {
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Look for the game through automatic providers (Steam)
    Detect,

    /// Copy the mod bootstrap into the game directory
    Install,

    /// Remove the bootstrap marker files from the game directory
    Uninstall,

    /// Start the game (elevated if the mod requires it)
    Launch,

    /// Open the mod folder in the file manager
    OpenModFolder,

    /// Open the mod loader's debug log
    Logs,
}

/// Subscriber writing to stderr and, when available, to the log file
fn build_subscriber(
    verbosity: u8,
    log_file: Option<std::fs::File>,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter = match verbosity {
        0 => "modstrap=info",
        1 => "modstrap=debug",
        2 => "modstrap=trace",
        _ => "trace",
    };

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Arc::new(file))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
}

fn setup_logging(verbosity: u8, paths: &Paths) {
    std::fs::create_dir_all(paths.data_dir()).ok();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths.log_file());

    match file {
        Ok(file) => build_subscriber(verbosity, Some(file)).init(),
        Err(e) => {
            build_subscriber(verbosity, None).init();
            tracing::warn!("Logging to stderr only, cannot open log file: {}", e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::new()?;
    setup_logging(cli.verbose, &paths);

    let mut config = Config::load(&paths).await?;
    if let Some(mod_dir) = cli.mod_dir.as_deref() {
        let trimmed = mod_dir.trim();
        if trimmed.is_empty() {
            anyhow::bail!("--mod-dir cannot be empty");
        }
        config.mod_dir = trimmed.to_string();
    }

    let layout = ModLayout::new(config.mod_dir());
    let settings = Arc::new(SettingsStore::new(paths.data_dir()));
    let detector = GameDetector::new(config.steam_libraries.iter().map(PathBuf::from).collect());
    let launcher = Arc::new(SystemLauncher::new(config.elevation_command.clone()));

    let mut app = App::new(layout, settings, detector, launcher);

    let mut updates = app.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snap = updates.borrow_and_update().clone();
            tracing::debug!("[{}] {}", snap.phase.display_name(), snap.status);
        }
    });

    app.load().await;

    match cli.command {
        Some(Commands::Status) | None => app.cmd_status().await?,
        Some(Commands::Drop { files }) => app.cmd_drop(&files).await?,
        Some(Commands::Detect) => app.cmd_detect().await?,
        Some(Commands::Install) => app.cmd_install().await?,
        Some(Commands::Uninstall) => app.cmd_uninstall().await?,
        Some(Commands::Launch) => app.cmd_launch().await?,
        Some(Commands::OpenModFolder) => app
            .cmd_open_mod_folder()
            .await
            .context("Failed to open the mod folder")?,
        Some(Commands::Logs) => app.cmd_logs().await?,
    }

    Ok(())
}
