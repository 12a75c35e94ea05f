//! LineStore Server Binary
//!
//! Serves an in-memory line store over TCP.

use std::sync::Arc;

use clap::Parser;
use linestore::network::Server;
use linestore::{MemoryStore, ServerConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// LineStore Server
#[derive(Parser, Debug)]
#[command(name = "linestore-server")]
#[command(about = "In-memory key-value line store server")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = linestore::config::DEFAULT_ADDR)]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Idle read timeout in milliseconds (0 = never)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Longest accepted key in bytes
    #[arg(long, default_value = "4096")]
    max_key_len: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linestore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("LineStore Server v{}", linestore::VERSION);

    let config = ServerConfig::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .max_key_len(args.max_key_len)
        .build();

    let server = match Server::bind(config, Arc::new(MemoryStore::new())) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
