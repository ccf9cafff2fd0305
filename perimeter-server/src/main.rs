use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use perimeter_server::config::ServerConfig;
use perimeter_server::state::AppState;

/// Firewall rule management API over a provider network backend.
#[derive(Parser)]
#[command(name = "perimeter-server")]
#[command(about = "Application-scoped firewall rule management API")]
#[command(version)]
struct Args {
    /// Listen address, overriding PORT from the environment
    #[arg(short, long)]
    listen: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(filter);
    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args.log_level, args.json_logs);

    let mut config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(AppState::new(config));
    let router = perimeter_server::create_router(state);

    info!("listening on {listen_addr}");
    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {listen_addr}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let serve = axum::serve(listener, router).with_graceful_shutdown(async {
        let _ = signal::ctrl_c().await;
        info!("shutdown signal received");
    });
    if let Err(err) = serve.await {
        error!("server error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
