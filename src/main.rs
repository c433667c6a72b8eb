//! Storage deal client.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │                 DealLifecycle                │
//!                 │  import → gen car → commP → start deal →     │
//!                 │                 update status                │
//!                 └───────────┬──────────────────────┬───────────┘
//!                             │                      │
//!                             ▼                      ▼
//!                   ┌──────────────────┐   ┌──────────────────┐
//!                   │   LotusClient    │   │    SwanClient    │
//!                   │ JSON-RPC, tuples │   │ REST, form, jwt  │
//!                   └────────┬─────────┘   └────────┬─────────┘
//!                            │                      │
//!                            ▼                      ▼
//!                   ┌─────────────────────────────────────────┐
//!                   │               Transport                 │
//!                   │   reqwest, bearer token, one deadline   │
//!                   └─────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use swan_client::config::{load_config, ClientConfig};
use swan_client::observability::{logging, metrics};
use swan_client::{DealLifecycle, DealRequest, DealStatus, LotusClient, SwanClient, Transport};

#[derive(Parser)]
#[command(name = "swan-client")]
#[command(about = "Propose storage deals and report them to the task service", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the storage provider node version
    Version,
    /// Show the storage provider's current ask
    Ask,
    /// Show the chain head
    Head,
    /// Import a file into the chain node
    Import {
        path: String,
        #[arg(long)]
        car: bool,
    },
    /// Compute the piece commitment of an archive
    Commp { path: String },
    /// List task service deals for a storage provider
    Deals {
        #[arg(long)]
        miner: String,
        #[arg(long, default_value = "Created")]
        status: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Propose a deal for a file and report it to the task service
    Propose {
        #[arg(long)]
        deal_id: i64,
        #[arg(long)]
        source: String,
        /// Generate the archive form at this path first
        #[arg(long)]
        car: Option<String>,
        #[arg(long)]
        start_epoch: i64,
        #[arg(long)]
        piece_size: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("swan-client v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let transport = Transport::new(&config.transport)?;
    let lotus = LotusClient::new(config.lotus.clone(), transport.clone());

    match cli.command {
        Commands::Version => print_json(&lotus.version().await?)?,
        Commands::Ask => print_json(&lotus.market_get_ask().await?)?,
        Commands::Head => {
            let head = lotus.chain_head().await?;
            print_json(&head.height)?;
        }
        Commands::Import { path, car } => print_json(&lotus.import(&path, car).await?)?,
        Commands::Commp { path } => print_json(&lotus.calc_commp(&path).await?)?,
        Commands::Deals { miner, status, limit } => {
            let swan = connect_swan(&config, transport).await;
            let deals = swan.fetch_deals(&miner, &status, limit).await;
            print_json(&deals)?;
        }
        Commands::Propose {
            deal_id,
            source,
            car,
            start_epoch,
            piece_size,
        } => {
            let swan = connect_swan(&config, transport).await;
            let lifecycle = DealLifecycle::new(lotus, swan, config.deal.clone());

            let mut request = DealRequest::new(deal_id, source, start_epoch);
            if let Some(car) = car {
                request = request.with_car(car);
            }
            if let Some(piece_size) = piece_size {
                request = request.with_piece_size(piece_size);
            }

            let outcome = lifecycle.propose(&request).await?;
            tracing::info!(status = %DealStatus::Created, "Reported to task service");
            println!("{}", outcome.proposal_cid);
        }
    }

    Ok(())
}

/// Open the task service session or stop the process: nothing else can
/// proceed without it.
async fn connect_swan(config: &ClientConfig, transport: Transport) -> SwanClient {
    match SwanClient::connect(&config.swan, transport).await {
        Ok(swan) => swan,
        Err(e) => {
            tracing::error!(error = %e, "Cannot open task service session");
            std::process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
