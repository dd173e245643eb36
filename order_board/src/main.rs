use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use order_board_engine::{BoardConfig, HiddenUpdatePolicy};

mod commands;
mod dashboard;
mod fade_timers;
mod formatting;
mod simulator;

#[derive(Parser, Debug)]
#[command(version, about = "Order board dashboard and order publisher")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "watch", about = "Run the interactive order board")]
    Watch(WatchParams),
    #[clap(name = "publish", about = "Send orders to the relay, as the point-of-sale system would")]
    Publish(PublishParams),
}

#[derive(Debug, Args)]
pub struct WatchParams {
    /// The relay address, as host:port. Overrides OB_RELAY_ADDRESS
    #[arg(short = 'r', long = "relay")]
    relay: Option<String>,
    /// Orders per page. Overrides OB_PAGE_SIZE
    #[arg(short = 'p', long = "page-size")]
    page_size: Option<usize>,
    /// Flag orders waiting longer than this many minutes. Overrides OB_LONG_WAIT_MINUTES
    #[arg(short = 'w', long = "long-wait")]
    long_wait: Option<i64>,
    /// Bring hidden orders back onto the board when they are updated
    #[arg(long = "reveal-updated")]
    reveal_updated: bool,
    /// Do not connect until `connect` is typed at the prompt
    #[arg(long = "offline")]
    offline: bool,
}

#[derive(Debug, Args)]
pub struct PublishParams {
    /// The relay address, as host:port. Overrides OB_RELAY_ADDRESS
    #[arg(short = 'r', long = "relay")]
    relay: Option<String>,
    /// A JSON file with a list of orders to send. Random orders are sent if this is omitted
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,
    /// The number of random orders to send
    #[arg(short = 'n', long = "count", default_value = "5")]
    count: usize,
    /// The order number of the first random order
    #[arg(short = 's', long = "start", default_value = "1001")]
    start: u64,
    /// Milliseconds to wait between orders
    #[arg(short = 'i', long = "interval", default_value = "500")]
    interval_ms: u64,
}

fn watch_config(params: &WatchParams) -> BoardConfig {
    let mut config = BoardConfig::from_env_or_default();
    if let Some(relay) = &params.relay {
        config.relay_address = relay.clone();
    }
    if let Some(page_size) = params.page_size.filter(|&n| n > 0) {
        config.page_size = page_size;
    }
    if let Some(long_wait) = params.long_wait {
        config.long_wait_threshold = long_wait;
    }
    if params.reveal_updated {
        config.hidden_update_policy = HiddenUpdatePolicy::Reveal;
    }
    config
}

async fn publish(params: PublishParams) -> Result<()> {
    let relay = params.relay.unwrap_or_else(|| BoardConfig::from_env_or_default().relay_address);
    let orders = match &params.file {
        Some(path) => simulator::load_orders(path)?,
        None => simulator::random_orders(&mut rand::thread_rng(), params.start, params.count),
    };
    simulator::publish(&relay, &orders, Duration::from_millis(params.interval_ms)).await
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    match cli.command {
        Command::Watch(params) => dashboard::run(watch_config(&params), !params.offline).await,
        Command::Publish(params) => publish(params).await,
    }
}
