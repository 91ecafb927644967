//! Read-only inspection CLI for the lottery contract.
//!
//! Listing, showing, and ticket lookups go through the same simulated-call
//! path the UI uses; signing stays with the wallet extension and is out of
//! scope for this binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nft_lottery_client::format::{format_price, Rarity};
use nft_lottery_client::{ChainClient, Config, LotteryContract};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every decodable lottery
    List,
    /// Show one lottery by id
    Show { id: u64 },
    /// Show ticket numbers held by an address in a lottery
    Tickets { address: String, id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file_with_env(&args.config)
            .with_context(|| format!("failed to load config from {}", args.config))?
    } else {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    };

    info!(rpc = %config.network.rpc_url, contract = %config.network.contract_id, "starting");

    let chain = Arc::new(ChainClient::new(&config.network)?);
    let contract = LotteryContract::new(chain, config.network.contract_id.clone());

    match args.command {
        Command::List => {
            let lotteries = contract.lotteries().await?;
            println!("{} lotteries", lotteries.len());
            for lottery in lotteries {
                print_lottery(&lottery);
            }
        }
        Command::Show { id } => {
            let lottery = contract.lottery(id).await?;
            print_lottery(&lottery);
        }
        Command::Tickets { address, id } => {
            let tickets = contract.user_tickets(&address, id).await?;
            if tickets.is_empty() {
                println!("no tickets held by {address} in lottery #{id}");
            } else {
                println!("tickets: {tickets:?}");
            }
        }
    }

    Ok(())
}

fn print_lottery(lottery: &nft_lottery_client::Lottery) {
    let rarity = Rarity::from_code(lottery.nft_prize.rarity);
    println!(
        "#{} {:<20} {:>8} / ticket  {}/{} sold  [{}]  {}",
        lottery.id,
        lottery.nft_prize.name,
        format_price(lottery.ticket_price),
        lottery.tickets_sold,
        lottery.max_tickets,
        rarity,
        match (&lottery.winner, lottery.is_active) {
            (Some(winner), _) => format!("winner: {winner}"),
            (None, false) => "drawn, no winner decoded".to_string(),
            (None, true) => "no winner yet".to_string(),
        }
    );
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "nft_lottery_client=debug,info"
    } else {
        "nft_lottery_client=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
