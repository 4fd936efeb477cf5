//! Pathway command line host
//!
//! Imports specs and environments into the local workspace, then exports or
//! sends stored requests resolved against the chosen environment.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;

use pathway::app::{Notification, Severity, Workbench};
use pathway::config::Config;
use pathway::models::Id;
use pathway::storage::{EnvironmentRepository, FolderRepository, RequestRepository, Storage};
use pathway::{logging, NetworkError};

#[derive(Parser)]
#[command(name = "pathway")]
#[command(about = "Import OpenAPI specs and environments, export requests as cURL")]
#[command(version)]
struct Cli {
    /// Workspace directory (default: ~/.pathway)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an OpenAPI 2.0 / 3.0 spec (.json, .yaml, .yml)
    ImportSpec { path: PathBuf },

    /// Import an environment export (.json)
    ImportEnv { path: PathBuf },

    /// List stored folders and requests with their ids
    List,

    /// Print a stored request as a cURL command
    Curl {
        request: Id,

        /// Environment resolved on top of the global one
        #[arg(long, short)]
        env: Option<String>,
    },

    /// Send a stored request. Ctrl-C cancels.
    Send {
        request: Id,

        #[arg(long, short)]
        env: Option<String>,
    },
}

fn report(notification: Notification) -> ExitCode {
    match notification.severity {
        Severity::Information => {
            println!("{}", notification.message);
            ExitCode::SUCCESS
        }
        Severity::Warning | Severity::Error => {
            eprintln!("{}", notification.message);
            ExitCode::FAILURE
        }
    }
}

fn environment_id(storage: &Storage, name: Option<&str>) -> Result<Option<Id>> {
    match name {
        Some(name) => {
            let environment = storage
                .get_environment_by_name(name)
                .map_err(|e| anyhow!("Environment '{}': {}", name, e))?;
            Ok(environment.id)
        }
        None => Ok(None),
    }
}

fn print_tree(storage: &Storage, parent: Option<Id>, depth: usize) -> Result<()> {
    for folder in storage.list_folders(parent)? {
        let Some(folder_id) = folder.id else { continue };
        println!("{}{}/", "  ".repeat(depth), folder.name);
        print_tree(storage, Some(folder_id), depth + 1)?;
        for request in storage.list_requests(folder_id)? {
            println!(
                "{}[{}] {} {} {}",
                "  ".repeat(depth + 1),
                request.id.unwrap_or_default(),
                request.method,
                request.name,
                request.url
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match cli.config_dir {
        Some(dir) => Config::with_dir(dir),
        None => Config::new(),
    };

    // Initialize logging to file
    let _guard = logging::init(&config)?;

    let storage = Storage::open(config.ensure_dir()?)?;
    let mut workbench = Workbench::new(storage);

    match cli.command {
        Commands::ImportSpec { path } => Ok(report(workbench.import_openapi_spec(&path))),
        Commands::ImportEnv { path } => Ok(report(workbench.import_environment(&path))),
        Commands::List => {
            print_tree(&workbench.store, None, 0)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Curl { request, env } => {
            let selected = environment_id(&workbench.store, env.as_deref())?;
            let template = workbench.store.get_request(request)?;
            let resolved = workbench.resolve(&template, selected)?;
            println!("{}", workbench.copy_as_curl(&resolved));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Send { request, env } => {
            let selected = environment_id(&workbench.store, env.as_deref())?;
            let template = workbench.store.get_request(request)?;
            let resolved = workbench.resolve(&template, selected)?;

            let (cancel_tx, cancel_rx) = oneshot::channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = cancel_tx.send(());
                }
            });

            match workbench.send(&resolved, cancel_rx).await {
                Ok(response) => {
                    println!("{} ({} ms)", response.status, response.time_ms);
                    println!("{}", response.body);
                    Ok(ExitCode::SUCCESS)
                }
                Err(NetworkError::Cancelled) => {
                    eprintln!("Request cancelled");
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => {
                    eprintln!("{}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
