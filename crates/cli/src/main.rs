//! evq - command-line front end for the durable event queue
//!
//! Every invocation opens the configured queue, hydrates it from storage and
//! runs one command against it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use evq_core::{BackendKind, EventQueue, Notification, QueueConfig, EVENT_DEQUEUED, EVENT_QUEUED};
use evq_infra_sqlite::SqliteAdapterFactory;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DB_PATH: &str = "~/.evq/queue.db";

#[derive(Parser)]
#[command(name = "evq")]
#[command(about = "Durable event queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage backend (memory, sqlite) [env: EVQ_BACKEND, default: sqlite]
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Storage host [env: EVQ_HOST, default: localhost]
    #[arg(long)]
    host: Option<String>,

    /// Storage port [env: EVQ_PORT, default: 0]
    #[arg(long)]
    port: Option<u16>,

    /// Database path [env: EVQ_PATH, default: ~/.evq/queue.db]
    #[arg(long)]
    path: Option<String>,

    /// Event names this queue is scoped to, comma separated [env: EVQ_EVENTS]
    #[arg(long, value_delimiter = ',')]
    events: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue a raw message
    Push {
        message: String,
    },

    /// Dequeue the next raw message
    Pop,

    /// Show the number of queued entries
    Len,

    /// Enqueue an RPC envelope
    Emit {
        /// Method name
        method: String,

        /// Payload as JSON string
        #[arg(long)]
        payload: Option<String>,
    },

    /// Dequeue the next RPC envelope
    Next,

    /// Dequeue and print every entry
    Drain,
}

/// Configuration used when neither a flag nor an `EVQ_*` variable is set
fn default_config() -> QueueConfig {
    QueueConfig::new(BackendKind::Sqlite)
        .with_host("localhost")
        .with_port(0)
        .with_path(DEFAULT_DB_PATH)
}

impl Cli {
    /// Apply command-line flags on top of `base` (defaults merged with the environment)
    fn config(&self, base: QueueConfig) -> QueueConfig {
        let mut config = base;

        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(host) = &self.host {
            config.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            config.port = Some(port);
        }
        if let Some(path) = &self.path {
            config.path = Some(path.clone());
        }
        if !self.events.is_empty() {
            config.events = self.events.clone();
        }

        config.path = config.path.map(|p| shellexpand::tilde(&p).into_owned());
        config
    }
}

fn init_logging() {
    let log_format = std::env::var("EVQ_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evq=warn"));

    // Logs go to stderr so command output stays pipeable
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Make sure the directory holding a file database exists
fn ensure_parent_dir(config: &QueueConfig) -> Result<()> {
    if config.backend != BackendKind::Sqlite {
        return Ok(());
    }
    let Some(path) = config.path.as_deref().filter(|p| *p != ":memory:") else {
        return Ok(());
    };
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let env_config = default_config()
        .merge_env()
        .context("Invalid EVQ_* environment")?;
    let config = cli.config(env_config);
    ensure_parent_dir(&config)?;

    let queue = EventQueue::open(config, Arc::new(SqliteAdapterFactory::default()))
        .await
        .context("Failed to open queue")?;

    if !queue.is_persistent() {
        eprintln!("{}", "⚠ Queue is running memory-only".yellow());
    }

    let hydrated = queue.hydrate().await;
    info!(hydrated, "Queue ready");

    queue.on(EVENT_QUEUED, |n: &Notification| info!(notification = ?n, "queued"));
    queue.on(EVENT_DEQUEUED, |n: &Notification| info!(notification = ?n, "dequeued"));

    match cli.command {
        Commands::Push { message } => {
            queue.enqueue(message).await;
            println!("{}", "✓ Message enqueued".green().bold());
        }

        Commands::Pop => match queue.dequeue().await {
            Some(entry) => println!("{}", entry.message),
            None => println!("{}", "Queue is empty".yellow()),
        },

        Commands::Len => {
            println!("{}", queue.len());
        }

        Commands::Emit { method, payload } => {
            let payload = payload
                .map(|raw| serde_json::from_str::<serde_json::Value>(&raw))
                .transpose()
                .context("Invalid JSON payload")?;

            let text = queue.enqueue_event(method, payload).await?;
            println!("{}", "✓ Event enqueued".green().bold());
            println!("  {} {}", "Envelope:".bold(), text);
        }

        Commands::Next => match queue.dequeue_event().await? {
            Some(envelope) => println!("{}", serde_json::to_string_pretty(&envelope)?),
            None => println!("{}", "Queue is empty".yellow()),
        },

        Commands::Drain => {
            let mut drained = 0usize;
            while let Some(entry) = queue.dequeue().await {
                println!("{}\t{}", entry.id.dimmed(), entry.message);
                drained += 1;
            }
            eprintln!("{}", format!("✓ {} entries drained", drained).green());
        }
    }

    Ok(())
}
