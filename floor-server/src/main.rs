use anyhow::Result;
use clap::Parser;
use floor_server::api::run_api_server;
use floor_server::args::ServerArgs;
use floor_server::{ServerConfig, Session};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    // 1. Configuration: defaults <- file <- environment <- command line
    let mut config = ServerConfig::load(args.config_path().map(|p| p.as_path()))?;
    if let Some(host) = args.host() {
        config.host = host.to_string();
    }
    if let Some(port) = args.port() {
        config.port = port;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    info!("=== Trading Floor Starting ===");

    // 2. Session actor (market, players, price ticks)
    let (session, _session_task) = Session::from_config(&config).spawn(config.tick_interval());

    // 3. Socket and HTTP routes
    run_api_server(session, &config.bind_address()).await
}
