use std::{env, process::ExitCode};

use dotenvy::dotenv;
use log::*;
use order_board_relay::{
    cli::{parse_invocation, usage, Invocation},
    config::RelayConfig,
    server::run_server,
};

#[actix_web::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();
    match parse_invocation(env::args().skip(1)) {
        Invocation::Serve => serve(RelayConfig::from_env_or_default()).await,
        Invocation::ShowHelp => {
            let log_filter = env::var("RUST_LOG").ok();
            println!("{}", usage(&RelayConfig::from_env_or_default(), log_filter.as_deref()));
            ExitCode::SUCCESS
        },
        Invocation::Unrecognized(arg) => {
            eprintln!("The relay does not understand '{arg}'. It is configured through OB_RELAY_HOST and OB_RELAY_PORT.");
            eprintln!("Run it with --help for details.");
            ExitCode::from(2)
        },
    }
}

async fn serve(config: RelayConfig) -> ExitCode {
    match run_server(config).await {
        Ok(()) => {
            info!("🚀️ Relay shut down");
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!("🚀️ Relay stopped. {e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}
