use anyhow::Result;
use axum::Router;
use clap::Parser;
use lexis_server::{build_app, ServerConfig};
use lexis_core::MAX_RESULTS;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "lexis-server", about = "Serve the corpus search API")]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Per-request timeout for storage and search work, in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,
    /// Maximum results per search (at most 20)
    #[arg(long, default_value_t = MAX_RESULTS)]
    max_results: usize,
    /// Snippet length in tokens
    #[arg(long, default_value_t = 50)]
    snippet_tokens: usize,
    /// Service name reported by /api
    #[arg(long, default_value = "Lexis Corpus API")]
    name: String,
    /// Report errors with 4xx/5xx status codes instead of 200
    #[arg(long, default_value_t = false)]
    strict_status: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig {
        name: args.name,
        request_timeout: Duration::from_millis(args.timeout_ms),
        max_results: args.max_results.clamp(1, MAX_RESULTS),
        snippet_tokens: args.snippet_tokens.max(1),
        strict_status: args.strict_status,
    };
    let app: Router = build_app(&args.index, config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, index = %args.index, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
