//! Post a single message to X.
//!
//! Exits 0 when the post is accepted and 1 otherwise.

use clap::Parser;
use std::process::ExitCode;
use strategy_agent_client::social::XClient;
use strategy_agent_client::XCredentials;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "post-to-x")]
#[command(about = "Post a message to X")]
struct Args {
    /// Message text (defaults to a timestamped test message)
    message: Option<String>,
}

fn default_message() -> String {
    format!(
        "Testing my crypto marketing bot at {}. #Crypto #Bitcoin #Trading #SuperiorAgents",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let message = args.message.unwrap_or_else(default_message);

    let credentials = match XCredentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!(error = %e, "X API credentials not found in environment");
            return ExitCode::FAILURE;
        }
    };

    match XClient::new(credentials).post_text(&message).await {
        Ok(posted) => {
            println!(
                "Successfully posted tweet with ID: {}",
                posted.id.as_deref().unwrap_or("unknown")
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Error posting to X");
            ExitCode::FAILURE
        }
    }
}
