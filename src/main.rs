//! babar command line
//!
//! Inspects the sessions and checkpoints recorded in a babar project.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use babar::{
    find_project_root, CheckpointStore, Codec, Database, JsonCodec, ProjectPaths, SessionStore,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "babar")]
#[command(version)]
#[command(about = "Inspect babar sessions and checkpoints")]
struct Cli {
    /// Project directory (defaults to the nearest ancestor with a `.babar.json`)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark a directory as a babar project root
    Init {
        /// Directory to initialize (defaults to the current directory)
        dir: Option<PathBuf>,
    },
    /// List recorded sessions
    Sessions,
    /// List the checkpoints of a session
    Checkpoints { session_id: i64 },
    /// Print a decoded checkpoint as JSON
    Show { checkpoint_id: i64 },
    /// Delete a session together with its checkpoints
    Delete { session_id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { dir } => init(dir),
        Commands::Sessions => {
            let (_, db) = open_project(cli.root)?;
            list_sessions(&db)
        }
        Commands::Checkpoints { session_id } => {
            let (_, db) = open_project(cli.root)?;
            list_checkpoints(&db, session_id)
        }
        Commands::Show { checkpoint_id } => {
            let (_, db) = open_project(cli.root)?;
            show_checkpoint(&db, checkpoint_id)
        }
        Commands::Delete { session_id } => {
            let (paths, db) = open_project(cli.root)?;
            delete_session(&paths, &db, session_id)
        }
    }
}

fn init(dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let paths = ProjectPaths::new(dir);
    let marker = paths.marker_path();
    if marker.exists() {
        println!("Already initialized: {}", paths.root().display());
        return Ok(());
    }
    std::fs::create_dir_all(paths.root())?;
    std::fs::write(&marker, "{}\n")
        .with_context(|| format!("failed to write {}", marker.display()))?;
    println!("Initialized babar project in {}", paths.root().display());
    Ok(())
}

fn open_project(root: Option<PathBuf>) -> Result<(ProjectPaths, Database)> {
    let start = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let Some(root) = find_project_root(&start) else {
        bail!(
            "no `.babar.json` found in {} or any of its parents (run `babar init`)",
            start.display()
        );
    };
    let paths = ProjectPaths::new(root);
    let db = Database::open(paths.database_path())?;
    Ok((paths, db))
}

fn format_time(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn list_sessions(db: &Database) -> Result<()> {
    let sessions = SessionStore::new(db.connection()).list()?;
    for session in sessions {
        println!(
            "{}\t{}\t{}\t{}",
            session.id,
            format_time(session.created_at()),
            session.name.as_deref().unwrap_or("-"),
            session.current_script
        );
    }
    Ok(())
}

fn list_checkpoints(db: &Database, session_id: i64) -> Result<()> {
    if SessionStore::new(db.connection()).get(session_id)?.is_none() {
        bail!("session {session_id} not found");
    }
    let checkpoints = CheckpointStore::new(db.connection()).list_for_session(session_id)?;
    for checkpoint in checkpoints {
        println!(
            "{}\t{}\t{} bytes",
            checkpoint.id,
            format_time(checkpoint.created_at()),
            checkpoint.serialized_data.len()
        );
    }
    Ok(())
}

fn show_checkpoint(db: &Database, checkpoint_id: i64) -> Result<()> {
    let (blob, session_id) = CheckpointStore::new(db.connection()).get_checkpoint(checkpoint_id)?;
    let document = JsonCodec
        .decode(&blob)
        .with_context(|| format!("checkpoint {checkpoint_id} is not JSON-encoded"))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "session_id": session_id,
            "checkpoint": document,
        }))?
    );
    Ok(())
}

fn delete_session(paths: &ProjectPaths, db: &Database, session_id: i64) -> Result<()> {
    if !SessionStore::new(db.connection()).delete(session_id)? {
        bail!("session {session_id} not found");
    }
    let session_dir = paths.session_dir(session_id);
    if session_dir.is_dir() {
        std::fs::remove_dir_all(&session_dir)
            .with_context(|| format!("failed to remove {}", session_dir.display()))?;
    }
    println!("Deleted session {session_id}");
    Ok(())
}
