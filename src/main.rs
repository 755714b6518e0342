//! miku-catalog - A command-line client for a hosted game catalog.
//!
//! The catalog lives in a Supabase project and is split across three tables,
//! one per game category:
//!
//! | Category | Table |
//! |----------|-------|
//! | general | `games` |
//! | adult | `h_games` |
//! | visual-novel | `galgames` |
//!
//! Only rows whose `status` is `active` are ever returned.
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your project settings:
//!
//! ```yaml
//! supabase:
//!   url: "https://project.supabase.co"
//!   anon_key: "public-anon-key"
//! ```
//!
//! Or set them from the environment with the `MIKU_` prefix:
//!
//! ```bash
//! export MIKU_SUPABASE__URL="https://project.supabase.co"
//! export MIKU_SUPABASE__ANON_KEY="public-anon-key"
//! ```
//!
//! # Usage
//!
//! ```bash
//! miku-catalog list
//! miku-catalog category galgames
//! miku-catalog search miku --category h_games
//! miku-catalog detail g1 games
//! miku-catalog ping
//! miku-catalog sync-version --root ../app
//! miku-catalog files scan ./mods
//! ```
//!
//! # Architecture
//!
//! - [`catalog`] - Backend requester, connection handle and catalog operations
//! - [`config`] - Configuration loading from YAML and environment variables
//! - [`files`] - Local file management for installed games and mods
//! - [`response`] - Plain text rendering of results
//! - [`version_sync`] - Build-time propagation of the application version
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::{
    catalog::{CatalogClient, Connection, GameCategory},
    config::Config,
    version_sync::VersionSync,
};

mod catalog;
mod config;
mod files;
mod response;
mod version_sync;

/// Command-line arguments of miku-catalog.
///
/// # Examples
///
/// ```bash
/// miku-catalog --config config.yaml --json search miku
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// Optional, values can come from `MIKU_` environment variables instead.
    /// See the [`config`] module for the expected format.
    #[arg(short, long)]
    config: Option<String>,

    /// Backend URL replacing the configured one.
    #[arg(long, requires = "key")]
    url: Option<String>,

    /// Access key replacing the configured one.
    #[arg(long, requires = "url")]
    key: Option<String>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Subcommands of miku-catalog.
#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Catalog(CatalogCommand),
    /// Propagate the version from version.json to the project files.
    SyncVersion {
        /// Project root containing version.json
        #[arg(short, long, default_value = ".")]
        root: String,
    },
    /// Manage local game and mod files.
    #[command(subcommand)]
    Files(FilesCommand),
}

/// Subcommands querying the catalog backend.
///
/// Categories are given by table name (`games`, `h_games`, `galgames`) or by
/// readable name (`general`, `adult`, `visual-novel`).
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// List the active games of every category.
    List,
    /// List the active games of one category, newest first.
    Category {
        /// Category to list
        category: GameCategory,
    },
    /// Search active games by title.
    Search {
        /// Case-insensitive part of the title
        keyword: String,
        /// Restrict the search to one category
        #[arg(short, long)]
        category: Option<GameCategory>,
    },
    /// Show the images of a game.
    Detail {
        /// Game id
        id: String,
        /// Category the game belongs to
        category: GameCategory,
    },
    /// Check that the backend answers.
    Ping,
}

/// Subcommands working on local files, no backend needed.
#[derive(Subcommand, Debug)]
enum FilesCommand {
    /// Print the directory the client runs from.
    AppDir,
    /// List the folders directly inside a directory.
    Scan { path: PathBuf },
    /// List every file below a directory.
    List { path: PathBuf },
    /// Create a directory and its parents.
    Mkdir { path: PathBuf },
    /// Tell whether a path exists.
    Exists { path: PathBuf },
    /// Copy a file, creating the destination folders.
    Copy { from: PathBuf, to: PathBuf },
    /// Write text to a file, creating its folders.
    Write { path: PathBuf, content: String },
    /// Delete a file.
    Delete { path: PathBuf },
    /// Print the content of a file.
    Read { path: PathBuf },
}

/// Main entry point of miku-catalog.
///
/// 1. **Logging Setup**: Configures the logger with `info` level by default
///    (can be overridden with the `RUST_LOG` environment variable)
/// 2. **Argument Parsing**: Parses command-line arguments using `clap`
/// 3. **Configuration Loading**: Reads the optional YAML file and the environment,
///    skipped by `sync-version` and `files`
/// 4. **Execution**: Runs the subcommand and prints its result on stdout
///
/// Errors are logged and turned into a failure exit code.
#[tokio::main]
async fn main() -> ExitCode {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    debug!("starting miku-catalog {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let command = match args.command {
        Command::SyncVersion { root } => return sync_version(&root).await,
        Command::Files(command) => return report(run_files(command, args.json).await),
        Command::Catalog(command) => command,
    };

    let config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = CatalogClient::new(Connection::new(
        &config.supabase.url,
        &config.supabase.anon_key,
    ));

    if let (Some(url), Some(key)) = (&args.url, &args.key) {
        if let Err(e) = client.reconfigure(url, key).await {
            error!("Failed to reconfigure connection: {}", e);
            return ExitCode::FAILURE;
        }
    }

    report(run(&client, command, args.json).await)
}

/// Turns the outcome of a subcommand into the process exit code.
fn report(outcome: Result<ExitCode, anyhow::Error>) -> ExitCode {
    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs a catalog subcommand and prints its result.
async fn run(
    client: &CatalogClient<Connection>,
    command: CatalogCommand,
    json: bool,
) -> Result<ExitCode, anyhow::Error> {
    match command {
        CatalogCommand::List => {
            let games = client.fetch_all_categories().await;
            print_result(json, &games, || response::format_games(&games))?;
        }
        CatalogCommand::Category { category } => {
            let records = client.fetch_category(category).await?;
            print_result(json, &records, || {
                response::format_records(category.table(), &records)
            })?;
        }
        CatalogCommand::Search { keyword, category } => {
            let games = client.search(&keyword, category).await;
            print_result(json, &games, || response::format_games(&games))?;
        }
        CatalogCommand::Detail { id, category } => {
            let images = client.fetch_game_detail(&id, category).await;
            print_result(json, &images, || {
                response::format_images(&id, images.as_ref())
            })?;
        }
        CatalogCommand::Ping => {
            // Surface a malformed endpoint instead of a bare "unreachable"
            let handle = client.get_connection().await?;
            if handle.anon_key().is_empty() {
                warn!("no access key configured");
            }
            let reachable = client.check_connectivity().await;
            let status = if reachable { "reachable" } else { "unreachable" };
            print_result(json, &reachable, || format!("{} is {}", handle.endpoint(), status))?;
            if !reachable {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Runs a file subcommand and prints its result.
async fn run_files(command: FilesCommand, json: bool) -> Result<ExitCode, anyhow::Error> {
    match command {
        FilesCommand::AppDir => {
            let dir = files::app_dir()?;
            print_result(json, &dir, || dir.display().to_string())?;
        }
        FilesCommand::Scan { path } => {
            let folders = files::scan_directory(&path).await?;
            print_result(json, &folders, || folders.join("\n"))?;
        }
        FilesCommand::List { path } => {
            let paths = files::list_files(&path).await?;
            print_result(json, &paths, || {
                paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<String>>()
                    .join("\n")
            })?;
        }
        FilesCommand::Mkdir { path } => files::create_directory(&path).await?,
        FilesCommand::Exists { path } => {
            let exists = files::exists(&path).await;
            print_result(json, &exists, || exists.to_string())?;
            if !exists {
                return Ok(ExitCode::FAILURE);
            }
        }
        FilesCommand::Copy { from, to } => files::copy_file(&from, &to).await?,
        FilesCommand::Write { path, content } => files::write_file(&path, &content).await?,
        FilesCommand::Delete { path } => files::delete_file(&path).await?,
        FilesCommand::Read { path } => {
            let content = files::read_file(&path).await?;
            print_result(json, &content, || content.clone())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Propagates the version of the project at `root`, see [`VersionSync`].
async fn sync_version(root: &str) -> ExitCode {
    match VersionSync::new(root).sync().await {
        Ok(report) => {
            info!(
                "version {} synced, {} files updated, {} failed",
                report.version,
                report.updated.len(),
                report.failed.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("version sync failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Prints `value` as pretty JSON, or the text produced by `text`.
fn print_result<T, F>(json: bool, value: &T, text: F) -> Result<(), anyhow::Error>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
