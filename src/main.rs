//! Strategy Agent Client CLI
//!
//! Command-line access to the backend database API and the RAG service.

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use strategy_agent_client::config::api_db_key_from_env;
use strategy_agent_client::{
    ApiDb, ChatHistory, ChatMessage, Config, Error, RagClient, Result, StrategyData,
    StrategyInsertData,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "agent-client")]
#[command(about = "Backend and RAG client for the strategy agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Config,

    /// Read and write strategies
    Strategies {
        #[command(subcommand)]
        action: StrategyCommand,
    },

    /// Manage agent sessions
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Print the latest notifications
    Notifications {
        /// Sources to request (defaults to the configured list)
        #[arg(short, long)]
        source: Vec<String>,

        /// Notifications per source
        #[arg(short, long)]
        limit: Option<u32>,

        /// Use the v1 feed, which fails instead of falling back
        #[arg(long)]
        legacy: bool,
    },

    /// Write a chat history file (JSON array of {role, content})
    Chat {
        #[arg(long)]
        session_id: String,

        #[arg(short, long)]
        file: PathBuf,

        /// First message timestamp, `YYYY-MM-DD HH:MM:SS` (defaults to now)
        #[arg(long)]
        base_timestamp: Option<String>,
    },

    /// Query or feed the RAG service
    Rag {
        #[arg(long)]
        agent_id: String,

        #[arg(long)]
        session_id: String,

        #[command(subcommand)]
        action: RagCommand,
    },
}

#[derive(Subcommand)]
enum StrategyCommand {
    /// Latest strategy of an agent
    Latest { agent_id: String },

    /// Every strategy of an agent
    All { agent_id: String },

    /// Parameters keyed by strategy id
    Params { agent_id: String },

    /// Store a new strategy
    Insert {
        agent_id: String,

        #[arg(long)]
        summary: String,

        #[arg(long)]
        full: String,

        /// Parameters as a JSON object
        #[arg(short = 'P', long)]
        params: Option<String>,
    },
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Register a session
    Create {
        agent_id: String,

        /// Session id (defaults to a new UUID)
        #[arg(long)]
        session_id: Option<String>,

        /// Start time (defaults to now, RFC 3339)
        #[arg(long)]
        started_at: Option<String>,

        #[arg(long, default_value = "running")]
        status: String,
    },

    /// Show a session
    Get { agent_id: String, session_id: String },

    /// Set a session's status
    Update {
        agent_id: String,
        session_id: String,

        #[arg(long)]
        status: String,

        /// Opaque frontend payload
        #[arg(long)]
        fe_data: Option<String>,
    },

    /// Increment a session's cycle counter
    AddCycle { agent_id: String, session_id: String },
}

#[derive(Subcommand)]
enum RagCommand {
    /// Strategies relevant to a query
    Search { query: String },

    /// Store strategies from a JSON file, or every strategy of the agent
    Save {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_env_overrides();

    match cli.command {
        Commands::Config => print_json(&config)?,
        Commands::Strategies { action } => run_strategies(&config, action).await?,
        Commands::Session { action } => run_session(&config, action).await?,
        Commands::Notifications {
            source,
            limit,
            legacy,
        } => {
            let db = api_db(&config)?;
            let sources = if source.is_empty() {
                config.notification_sources.clone()
            } else {
                source
            };
            let text = if legacy {
                db.fetch_latest_notification_str(&sources).await?
            } else {
                let limit = limit.unwrap_or(config.notification_limit);
                db.fetch_latest_notification_str_v2(&sources, limit).await
            };
            println!("{}", text);
        }
        Commands::Chat {
            session_id,
            file,
            base_timestamp,
        } => {
            let history = read_chat_history(&file)?;
            tracing::info!(session_id = %session_id, messages = history.len(), "Writing chat history");
            api_db(&config)?
                .insert_chat_history(&session_id, &history, base_timestamp.as_deref())
                .await;
        }
        Commands::Rag {
            agent_id,
            session_id,
            action,
        } => run_rag(&config, agent_id, session_id, action).await?,
    }

    Ok(())
}

fn api_db(config: &Config) -> Result<ApiDb> {
    let api_key = api_db_key_from_env()?;
    Ok(ApiDb::new(&config.api_db_base_url, &api_key))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_strategies(config: &Config, action: StrategyCommand) -> Result<()> {
    let db = api_db(config)?;
    match action {
        StrategyCommand::Latest { agent_id } => match db.fetch_latest_strategy(&agent_id).await {
            Some(strategy) => print_json(&strategy)?,
            None => println!("No strategy found for agent {}", agent_id),
        },
        StrategyCommand::All { agent_id } => {
            print_json(&db.fetch_all_strategies(&agent_id).await)?
        }
        StrategyCommand::Params { agent_id } => {
            print_json(&db.fetch_params_by_agent_id(&agent_id).await?)?
        }
        StrategyCommand::Insert {
            agent_id,
            summary,
            full,
            params,
        } => {
            let parameters: Map<String, Value> = match params {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|e| Error::InvalidArgument(format!("--params: {}", e)))?,
                None => Map::new(),
            };
            let strategy = StrategyInsertData {
                summarized_desc: summary,
                full_desc: full,
                parameters,
            };
            db.insert_strategy_and_result(&agent_id, &strategy).await;
            tracing::info!(agent_id = %agent_id, "Strategy submitted");
        }
    }
    Ok(())
}

async fn run_session(config: &Config, action: SessionCommand) -> Result<()> {
    let db = api_db(config)?;
    match action {
        SessionCommand::Create {
            agent_id,
            session_id,
            started_at,
            status,
        } => {
            let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let started_at = started_at.unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
            db.create_session(&session_id, &agent_id, &started_at, &status)
                .await;
            println!("{}", session_id);
        }
        SessionCommand::Get {
            agent_id,
            session_id,
        } => match db.get_session(&session_id, &agent_id).await {
            Some(session) => print_json(&session)?,
            None => println!("Session {} not found", session_id),
        },
        SessionCommand::Update {
            agent_id,
            session_id,
            status,
            fe_data,
        } => {
            db.update_session(&session_id, &agent_id, &status, fe_data.as_deref())
                .await;
        }
        SessionCommand::AddCycle {
            agent_id,
            session_id,
        } => {
            db.add_cycle_count(&session_id, &agent_id).await;
        }
    }
    Ok(())
}

async fn run_rag(
    config: &Config,
    agent_id: String,
    session_id: String,
    action: RagCommand,
) -> Result<()> {
    let rag = RagClient::new(&agent_id, &session_id, &config.rag_base_url)
        .with_timeout(config.rag_timeout());

    match action {
        RagCommand::Search { query } => print_json(&rag.relevant_strategy_raw(&query).await)?,
        RagCommand::Save { file } => {
            let batch: Vec<StrategyData> = match file {
                Some(path) => serde_json::from_str(&read_file(&path)?)?,
                None => api_db(config)?.fetch_all_strategies(&agent_id).await,
            };
            tracing::info!(agent_id = %agent_id, count = batch.len(), "Saving strategies to RAG");
            print_json(&rag.save_result_batch(&batch).await)?;
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidArgument(format!("Failed to read {}: {}", path.display(), e)))
}

fn read_chat_history(path: &Path) -> Result<ChatHistory> {
    let messages: Vec<ChatMessage> = serde_json::from_str(&read_file(path)?)?;
    Ok(ChatHistory::new(messages))
}
