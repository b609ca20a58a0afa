//! Banana Book CLI
//!
//! Command-line interface for Banana Book - notes, photos and whole-store backups.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use banana_core::{
    spawn_session_worker, Config, ExportMode, Session, SessionHandle, WorkerStatus,
};

mod commands;
mod editor;
mod logging;
mod output;
mod surfaces;

use output::{Output, OutputFormat};
use surfaces::CliSurfaces;

#[derive(Parser)]
#[command(name = "banana")]
#[command(about = "Banana Book - notes and photos in a single local file")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Answer yes to permission and confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Manage photos
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Export the store file
    Export {
        /// Directory to write the copy into
        #[arg(long, value_name = "DIR", conflicts_with = "share")]
        dir: Option<PathBuf>,
        /// Hand the file to the system opener instead
        #[arg(long)]
        share: bool,
    },
    /// Replace all notes and photos with a backup file
    Import {
        /// Backup file (prompts if not provided)
        file: Option<PathBuf>,
    },
    /// Show store location, size and counts
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Add a note
    #[command(alias = "create")]
    Add {
        /// Note text (opens editor if not provided)
        text: Option<String>,
    },
    /// List notes, newest first
    #[command(alias = "ls")]
    List,
    /// Show a note in full
    Show { id: i64 },
    /// Replace a note's text
    Edit {
        id: i64,
        /// New text (opens editor if not provided)
        text: Option<String>,
    },
    /// Delete a note
    #[command(alias = "delete")]
    Rm { id: i64 },
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Add a photo
    Add {
        /// Photo file (prompts if not provided)
        path: Option<PathBuf>,
    },
    /// List photos, newest first
    #[command(alias = "ls")]
    List,
    /// Point a photo record at a different file
    Relink { id: i64, path: PathBuf },
    /// Delete a photo record
    #[command(alias = "delete")]
    Rm { id: i64 },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, store_name, export_mode, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init_logging(&config);

    let surfaces = surfaces_for(&cli);
    let session = Session::open(config.clone()).context("Failed to open store")?;
    let handle = spawn_session_worker(session, surfaces);

    let result = run(cli, &handle, &config, &output).await;

    handle.shutdown().await;
    if handle.status() != WorkerStatus::Stopped {
        tracing::warn!("Session worker did not report a clean stop");
    }
    result
}

/// Pre-answer the surfaces with whatever the command line already says
fn surfaces_for(cli: &Cli) -> CliSurfaces {
    let surfaces = CliSurfaces::new(cli.yes);
    match &cli.command {
        Commands::Import { file } => surfaces.with_import_path(file.clone()),
        Commands::Export { dir, .. } => surfaces.with_export_dir(dir.clone()),
        Commands::Image {
            command: ImageCommands::Add { path },
        } => surfaces.with_capture_path(path.clone()),
        _ => surfaces,
    }
}

async fn run(cli: Cli, handle: &SessionHandle, config: &Config, output: &Output) -> Result<()> {
    match cli.command {
        Commands::Note { command } => handle_note_command(command, handle, cli.yes, output).await,
        Commands::Image { command } => {
            handle_image_command(command, handle, cli.yes, output).await
        }
        Commands::Export { dir, share } => {
            let mode = export_mode(dir.is_some(), share, config.export_mode);
            commands::backup::export(handle, mode, output).await
        }
        Commands::Import { .. } => commands::backup::import(handle, output).await,
        Commands::Status => commands::status::show(handle, config, output).await,
        Commands::Config { .. } => Ok(()), // Handled before the store is opened
    }
}

/// Flags win over the configured default
fn export_mode(dir_given: bool, share: bool, configured: ExportMode) -> ExportMode {
    if share {
        ExportMode::Share
    } else if dir_given {
        ExportMode::Directory
    } else {
        configured
    }
}

async fn handle_note_command(
    command: NoteCommands,
    handle: &SessionHandle,
    assume_yes: bool,
    output: &Output,
) -> Result<()> {
    match command {
        NoteCommands::Add { text } => commands::note::create(handle, text, output).await,
        NoteCommands::List => commands::note::list(handle, output).await,
        NoteCommands::Show { id } => commands::note::show(handle, id, output).await,
        NoteCommands::Edit { id, text } => commands::note::edit(handle, id, text, output).await,
        NoteCommands::Rm { id } => commands::note::delete(handle, id, assume_yes, output).await,
    }
}

async fn handle_image_command(
    command: ImageCommands,
    handle: &SessionHandle,
    assume_yes: bool,
    output: &Output,
) -> Result<()> {
    match command {
        ImageCommands::Add { .. } => commands::image::add(handle, output).await,
        ImageCommands::List => commands::image::list(handle, output).await,
        ImageCommands::Relink { id, path } => {
            commands::image::relink(handle, id, path, output).await
        }
        ImageCommands::Rm { id } => commands::image::delete(handle, id, assume_yes, output).await,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
