mod app;
mod assets;
mod commands;
mod config;
mod db;
mod event;
mod notify;
mod reminders;
mod share;
mod tasks;
mod theme;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jotter")]
#[command(about = "A terminal notebook for tasks and notes, offline-first")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/jotter/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Data directory override (database, log file, share fallback)
  #[arg(short, long)]
  data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override data directory if specified on command line
  let config = if let Some(data_dir) = args.data_dir {
    config::Config {
      data_dir: Some(data_dir),
      ..config
    }
  } else {
    config
  };

  // Logs go to a file; the terminal belongs to the UI
  let data_dir = config.data_dir()?;
  std::fs::create_dir_all(&data_dir)?;
  let _guard = init_logging(&data_dir);

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}

fn init_logging(data_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
  let file = tracing_appender::rolling::never(data_dir, "jotter.log");
  let (writer, guard) = tracing_appender::non_blocking(file);

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_env("JOTTER_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(writer)
    .with_ansi(false)
    .init();

  guard
}
