use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stepbar::app::App;
use stepbar::config::Config;
use stepbar::logging;
use stepbar::snapshot::LayoutSnapshot;

#[derive(Parser)]
#[command(name = "stepbar")]
#[command(about = "Horizontal step progress bar for terminal UIs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the computed layout as JSON
    Layout {
        /// Container width (default: the bar's preferred width)
        #[arg(short, long)]
        width: Option<f32>,

        /// Container height; room for titles is added on top, as the bar
        /// does when measuring itself (default: the bar's preferred height)
        #[arg(long)]
        height: Option<f32>,

        /// Current step, 0-based
        #[arg(short = 'n', long)]
        current: Option<usize>,
    },

    /// Write the default configuration as TOML
    Init {
        /// Output file (default: stepbar.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // No subcommand means the TUI demo, which owns the terminal
    let is_tui_mode = cli.command.is_none();

    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Layout {
            width,
            height,
            current,
        }) => {
            cmd_layout(&config, width, height, current)?;
        }
        Some(Commands::Init { path, force }) => {
            cmd_init(path, force)?;
        }
        None => {
            if let Some(path) = &logging_handle.log_file_path {
                tracing::info!(path = %path.display(), "logging to file");
            }
            let mut app = App::new(config)?;
            app.run().await?;
        }
    }

    Ok(())
}

fn cmd_layout(
    config: &Config,
    width: Option<f32>,
    height: Option<f32>,
    current: Option<usize>,
) -> Result<()> {
    let mut engine = config.engine()?;
    let (width, height) = engine.preferred_size(width, height);
    engine.set_container_size(width, height)?;

    if let Some(current) = current {
        engine.update_step_state(current)?;
    }

    let snapshot = LayoutSnapshot::capture(&mut engine)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn cmd_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(Config::local_config_path);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default()
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
