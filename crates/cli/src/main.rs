//! `vertex-flow` CLI entry-point.
//!
//! Available sub-commands:
//! - `seed`    : write the starter workflow to a file.
//! - `validate`: check a workflow file's graph invariants.
//! - `plan`    : print the execution plan Run would report.
//! - `drop`    : instantiate a node template into a workflow file.
//! - `connect` : add an edge between two nodes of a workflow file.
//! - `collapse`: toggle a group's children in a workflow file.
//! - `save`    : save a workflow file to local storage and the download dir.
//! - `load`    : print the workflow held in local storage.
//! - `share`   : print the JSON Share would copy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use engine::{
    validate_graph, Clipboard, Connection, DropEvent, EditorConfig, EngineError, LoadOutcome,
    Session, XYPosition,
};

#[derive(Parser)]
#[command(
    name = "vertex-flow",
    about = "Assemble and inspect visual workflow graphs",
    version
)]
struct Cli {
    /// Directory backing local storage.
    #[arg(long, global = true, env = "VERTEX_STORAGE_DIR", default_value = ".vertex")]
    storage_dir: PathBuf,

    /// Directory that receives downloadable saves.
    #[arg(long, global = true, env = "VERTEX_DOWNLOAD_DIR", default_value = ".")]
    download_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the starter workflow (a dataset feeding a prompt).
    Seed {
        out: PathBuf,
        #[arg(long, default_value = "Untitled Workflow")]
        title: String,
    },
    /// Validate a workflow file's graph.
    Validate { path: PathBuf },
    /// Print the execution plan for a workflow file.
    Plan { path: PathBuf },
    /// Drop a node template into a workflow file.
    Drop {
        path: PathBuf,
        /// Palette token: dataset, prompt, group, default, input, output.
        token: String,
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
    },
    /// Connect two nodes in a workflow file.
    Connect {
        path: PathBuf,
        source: String,
        target: String,
    },
    /// Collapse (or, with --expand, expand) a group in a workflow file.
    Collapse {
        path: PathBuf,
        group_id: String,
        #[arg(long)]
        expand: bool,
    },
    /// Save a workflow file to local storage and the download directory.
    Save { path: PathBuf },
    /// Print the workflow held in local storage.
    Load,
    /// Print the JSON that Share would copy.
    Share { path: PathBuf },
}

/// Share target for a terminal: the text goes to stdout.
struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<(), EngineError> {
        println!("{text}");
        Ok(())
    }
}

fn session(cli: &Cli) -> Session {
    let config = EditorConfig {
        storage_dir: cli.storage_dir.clone(),
        download_dir: cli.download_dir.clone(),
        ..EditorConfig::default()
    };
    Session::from_config(config, Arc::new(StdoutClipboard))
}

async fn open(cli: &Cli, path: &Path) -> Result<Session> {
    let mut session = session(cli);
    session
        .load_file(path)
        .await
        .with_context(|| format!("cannot load workflow {}", path.display()))?;
    Ok(session)
}

async fn write_back(session: &Session, path: &Path) -> Result<()> {
    let text = session.share_text()?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), "workflow written");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Seed { out, title } => {
            let mut session = session(&cli).with_seed_graph();
            session.set_title(title);
            write_back(&session, out).await?;
            println!("Wrote seed workflow to {}", out.display());
        }
        Command::Validate { path } => {
            let session = open(&cli, path).await?;
            let graph = session.snapshot();
            match validate_graph(&graph.nodes, &graph.edges) {
                Ok(()) => println!(
                    "✅ Workflow is valid: {} nodes, {} edges.",
                    graph.nodes.len(),
                    graph.edges.len()
                ),
                Err(e) => {
                    eprintln!("❌ Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Plan { path } => {
            let session = open(&cli, path).await?;
            print!("{}", session.run()?);
        }
        Command::Drop { path, token, x, y } => {
            let session = open(&cli, path).await?;
            let added = session.drop_template(&DropEvent::new(token, XYPosition::new(*x, *y)))?;
            write_back(&session, path).await?;
            for node in &added.nodes {
                println!("+ {} {} \"{}\"", node.id, node.kind, node.label());
            }
        }
        Command::Connect { path, source, target } => {
            let session = open(&cli, path).await?;
            let graph = session.snapshot();
            for id in [source, target] {
                if graph.node(id).is_none() {
                    bail!("no node with id '{id}'");
                }
            }
            match session.connect(&Connection::new(source, target)) {
                Some(edge_id) => {
                    write_back(&session, path).await?;
                    println!("+ edge {edge_id}");
                }
                None => println!("edge {source} → {target} already exists"),
            }
        }
        Command::Collapse { path, group_id, expand } => {
            let session = open(&cli, path).await?;
            if *expand {
                session.mark_collapsed(group_id);
            }
            let collapsed = session.toggle_collapse(group_id)?;
            write_back(&session, path).await?;
            println!(
                "group {group_id} is now {}",
                if collapsed { "collapsed" } else { "expanded" }
            );
        }
        Command::Save { path } => {
            let session = open(&cli, path).await?;
            let receipt = session.save().await?;
            println!("Saved to local storage and {}", receipt.download.display());
        }
        Command::Load => {
            let mut session = session(&cli);
            match session.load().await? {
                LoadOutcome::Loaded { .. } => {
                    session.share()?;
                }
                LoadOutcome::NothingSaved => {
                    println!("No saved workflow found. Pass a workflow file to `plan` or `save`.");
                }
            }
        }
        Command::Share { path } => {
            open(&cli, path).await?.share()?;
        }
    }

    Ok(())
}
