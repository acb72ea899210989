//! trace-log-relay demo host.
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP request ──▶ TraceLayer ──▶ TraceContextLayer ──▶ /weatherforecast
//!                                   (traceparent →        │
//!                                    task-local context)  │ log_info!
//!                                                         ▼
//!                                              ┌─────────────────────┐
//!                                              │   LoggerPipeline    │
//!                                              │ level filter        │
//!                                              │ enricher            │
//!                                              │ dispatcher          │
//!                                              └──────┬───────┬──────┘
//!                                                     │       │
//!                                      console (stdout)       collector (spawned HTTPS POST)
//! ```
//!
//! The host's own diagnostics go through `tracing` to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::net::TcpListener;

use trace_log_relay::config::{load_config_with_overrides, SinkTarget};
use trace_log_relay::http::HttpServer;
use trace_log_relay::lifecycle::{wait_for_signal, Shutdown};
use trace_log_relay::observability::{logging, metrics};
use trace_log_relay::pipeline::LoggerPipeline;
use trace_log_relay::sinks::tls;

#[derive(Parser)]
#[command(name = "trace-log-relay")]
#[command(about = "Demo host for the trace-correlated log pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo HTTP host
    Serve {
        /// Path to the TOML configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Token for every collector sink, overriding the file
        #[arg(long, env = "COLLECTOR_AUTH_TOKEN", hide_env_values = true)]
        collector_token: Option<String>,
    },
    /// Print the SHA-256 fingerprint of a PEM certificate
    Fingerprint {
        /// PEM file holding the collector certificate
        pem: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            collector_token,
        } => serve(config, collector_token).await,
        Commands::Fingerprint { pem } => {
            let bytes = std::fs::read(&pem)?;
            let fingerprint = tls::fingerprint_pem(&bytes)?;
            println!("{}", tls::format_fingerprint(&fingerprint));
            Ok(())
        }
    }
}

async fn serve(
    config_path: PathBuf,
    collector_token: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&config_path, |config| {
        if let Some(token) = &collector_token {
            for sink in &mut config.pipeline.sinks {
                if let SinkTarget::HttpCollector(target) = sink {
                    target.auth_token = token.clone();
                }
            }
        }
    })?;

    logging::init_tracing(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "trace-log-relay starting"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let pipeline = LoggerPipeline::from_config(&config.pipeline)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config.server, pipeline.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;

    if !shutdown
        .drain(server_task, &pipeline, pipeline.default_grace())
        .await
    {
        tracing::warn!("Exiting with log deliveries still in flight");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
