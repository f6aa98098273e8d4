//! StageSync command-line interface
//!
//! Thin shell over the sync engine: captures insights from the command line
//! and inspects the persisted views.

use anyhow::Result;
use clap::{Parser, Subcommand};
use stagesync::{
    config::StorageBackend,
    insight::{InsightKind, InsightSource},
    progress::StageStatus,
    storage::{FileMedium, Storage},
    StageSyncConfig, SyncCoordinator,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stagesync")]
#[command(version)]
#[command(about = "Local multi-store synchronization engine for staged project workspaces")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STAGESYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory override
    #[arg(long, env = "STAGESYNC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture an insight and propagate it into every store
    Add {
        /// Stage the insight belongs to
        #[arg(short, long)]
        stage: String,

        /// Project the insight belongs to
        #[arg(short, long)]
        project: String,

        /// Capture source (chat, ai-summary, manual)
        #[arg(short, long, default_value = "manual")]
        kind: String,

        /// Insight text (read from stdin when omitted)
        content: Option<String>,
    },

    /// Show note documents
    Notes {
        /// Only the note for this stage
        stage: Option<String>,
    },

    /// Show a project's Kanban board
    Progress {
        /// Project id
        project: String,
    },

    /// Set a stage's status on the board
    SetStatus {
        /// Project id
        project: String,

        /// Stage id
        stage: String,

        /// New status (in-progress, done)
        status: String,
    },

    /// Show conversational memory records
    Memory {
        /// Bias toward this stage
        #[arg(short, long)]
        stage: Option<String>,
    },

    /// Show the stage-continuity trail
    Context,

    /// Empty the memory and continuity buffers
    Clear,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("stagesync={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => StageSyncConfig::load(path)?,
        None => StageSyncConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    if let Commands::Config { default } = &cli.command {
        let shown = if *default {
            StageSyncConfig::default()
        } else {
            config
        };
        println!("{}", toml::to_string(&shown)?);
        return Ok(());
    }

    let storage = open_storage(&config)?;
    let coordinator = SyncCoordinator::with_config(storage, &config);

    match cli.command {
        Commands::Add {
            stage,
            project,
            kind,
            content,
        } => {
            let kind: InsightKind = kind.parse().map_err(anyhow::Error::msg)?;
            let content = match content {
                Some(text) => text,
                None => {
                    use std::io::Read;
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            let report = coordinator.add_insight(InsightSource::new(kind, content, stage, project));
            if report.fully_applied() {
                println!("Synced insight into {}", report.note_id);
            } else {
                for step in &report.steps {
                    if let Some(error) = &step.error {
                        eprintln!("step {} failed: {}", step.step, error);
                    }
                }
                anyhow::bail!("insight only partially propagated");
            }
        }

        Commands::Notes { stage } => {
            let notes = match stage {
                Some(stage) => coordinator.notes().get(&stage).into_iter().collect(),
                None => coordinator.notes().all(),
            };
            for note in notes {
                println!(
                    "## {} [{}] ({}, updated {})",
                    note.title,
                    note.system,
                    note.project_id,
                    format_millis(note.updated_at)
                );
                print!("{}", note.content.to_plain_text());
                println!();
            }
        }

        Commands::Progress { project } => {
            for (stage, status) in coordinator.progress().board(&project) {
                println!("{}: {}", stage, status);
            }
        }

        Commands::SetStatus {
            project,
            stage,
            status,
        } => {
            let status: StageStatus = status.parse().map_err(anyhow::Error::msg)?;
            coordinator.progress().set_status(&project, &stage, status)?;
            println!("{}/{} -> {}", project, stage, status);
        }

        Commands::Memory { stage } => {
            for record in coordinator.memory_for_llm(stage.as_deref()) {
                println!(
                    "[{}] {} {}/{}: {}",
                    format_millis(record.timestamp),
                    record.kind,
                    record.project_id,
                    record.stage_id,
                    record.content
                );
            }
        }

        Commands::Context => {
            for record in coordinator.stage_context() {
                println!(
                    "{} ({}) [{}]",
                    record.stage_name, record.project_id, record.os_type
                );
            }
        }

        Commands::Clear => {
            coordinator.clear()?;
            println!("Cleared memory and continuity buffers");
        }

        Commands::Config { .. } => unreachable!("handled before storage setup"),
    }

    Ok(())
}

/// Open the storage backend selected by the configuration.
fn open_storage(config: &StageSyncConfig) -> Result<Storage> {
    let storage = match config.storage.backend {
        StorageBackend::File => Storage::new(Arc::new(FileMedium::new(
            config.storage.resolved_data_dir(),
        )?)),
        StorageBackend::Memory => Storage::in_memory(),
    };
    Ok(storage)
}

/// Render a Unix-millisecond timestamp for display.
fn format_millis(timestamp: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(timestamp as i64)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
