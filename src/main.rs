//! pagegate — link-rewriting web proxy.
//!
//! Fetches remote pages on a client's behalf, rewrites absolute links in HTML
//! so further navigation stays routed through the proxy, and applies
//! per-client rolling-window admission control.
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                  PAGEGATE                    │
//!     Client Request    │  ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//!     ──────────────────┼─▶│rate limit│──▶│ router  │──▶│ validator │  │
//!                       │  └──────────┘   └─────────┘   └─────┬─────┘  │
//!                       │                                     ▼        │
//!     Client Response   │  ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//!     ◀─────────────────┼──│ rewriter │◀──│forwarder│◀──│  client   │◀─┼── Upstream
//!                       │  │ (HTML)   │   │         │   │ (reqwest) │  │
//!                       │  └──────────┘   └─────────┘   └───────────┘  │
//!                       └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagegate::config::{apply_env_overrides, load_config, ProxyConfig};
use pagegate::http::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "pagegate", about = "Link-rewriting web proxy")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Override the listening port (takes precedence over file and PORT env).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagegate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("pagegate v0.1.0 starting");

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config);
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    tracing::info!(
        port = config.listener.port,
        rate_limit_enabled = config.rate_limit.enabled,
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            pagegate::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let bind = format!("{}:{}", config.listener.bind_address, config.listener.port);
    let listener = TcpListener::bind(&bind).await?;

    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
