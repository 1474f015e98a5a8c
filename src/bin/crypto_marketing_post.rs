//! Compose a post about today's trending coins and publish it to X.
//!
//! Market data is best-effort; a post is always composed. Exits 0 when the
//! post is accepted and 1 otherwise.

use clap::Parser;
use std::process::ExitCode;
use strategy_agent_client::config::coingecko_key_from_env;
use strategy_agent_client::market::{collect_mentions, compose_post, CoinGeckoClient};
use strategy_agent_client::social::XClient;
use strategy_agent_client::XCredentials;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "crypto-marketing-post")]
#[command(about = "Post trending coins with prices to X")]
struct Args {
    /// Print the composed post without publishing it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let market = CoinGeckoClient::new(coingecko_key_from_env());
    let trending = market.trending_coins().await;
    let mentions = collect_mentions(&market, &trending).await;
    tracing::info!(trending = trending.coins.len(), "Fetched trending coins");

    let post = compose_post(&mentions, &mut rand::thread_rng(), &chrono::Local::now());
    println!("Generated tweet: {}", post);

    if args.dry_run {
        return ExitCode::SUCCESS;
    }

    let credentials = match XCredentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!(error = %e, "X API credentials not found in environment");
            return ExitCode::FAILURE;
        }
    };

    match XClient::new(credentials).post_text(&post).await {
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
