// src/main.rs
use anyhow::Context;
use clap::{Parser, Subcommand};
use crypto_cache_refresher::{
    config::load_config,
    refresh::run_refresh,
    server::TriggerServer,
    store,
    utils::setup_logging,
};
use log::{error, info, warn, LevelFilter};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "crypto-cache-refresher", version, about = "Refreshes the LunarCrush crypto cache tables")]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one refresh and exit (0 only when every group succeeded)
    Run,
    /// Serve the HTTP refresh trigger
    Serve {
        /// Overrides SERVER_PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env may carry LOG_LEVEL, so load it before clap reads the environment
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let level = match cli.log_level.parse::<LevelFilter>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Invalid log level '{}', falling back to info", cli.log_level);
            LevelFilter::Info
        }
    };
    if let Err(e) = setup_logging(level) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match execute(cli.command.unwrap_or(Command::Run)).await {
        Ok(code) => code,
        Err(e) => {
            error!("🔥 {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command) -> anyhow::Result<ExitCode> {
    let config = load_config().context("failed to load configuration")?;
    let store = store::connect(&config)
        .await
        .context("failed to open cache store")?;

    let shutdown = CancellationToken::new();
    spawn_ctrl_c_handler(shutdown.clone());

    match command {
        Command::Run => {
            let summary = run_refresh(config, store, shutdown).await?;
            for message in &summary.errors {
                warn!("⚠️ {}", message);
            }
            info!(
                "Run finished with status {} ({} ok / {} failed)",
                summary.status, summary.successful_endpoints, summary.failed_endpoints
            );
            Ok(if summary.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server_port);
            TriggerServer::new(port, config, store, shutdown)
                .start()
                .await
                .context("refresh trigger server failed")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn spawn_ctrl_c_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("🛑 Shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });
}
