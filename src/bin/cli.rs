//! LineStore CLI Client
//!
//! Command-line interface for interacting with a line store.

use clap::{Parser, Subcommand};
use linestore::{Client, Config, LineError};
use tracing_subscriber::{fmt, EnvFilter};

/// LineStore CLI
#[derive(Parser, Debug)]
#[command(name = "linestore-cli")]
#[command(about = "CLI for the LineStore key-value line store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = linestore::config::DEFAULT_ADDR)]
    server: String,

    /// Lines fetched per page when listing
    #[arg(short, long, default_value_t = linestore::config::DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Per-call timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a line by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a line
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a line
    Del {
        /// The key to delete
        key: String,
    },

    /// Ping the server
    Ping,

    /// List every line, page by page
    List,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let config = Config::builder()
        .addr(&args.server)
        .page_size(args.page_size)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let mut client = match Client::connect(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let outcome = run(&mut client, args.command);
    client.close();

    match outcome {
        Ok(()) => {}
        Err(LineError::NotFound(key)) => {
            eprintln!("(not found) {}", key);
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run(client: &mut Client, command: Commands) -> linestore::Result<()> {
    match command {
        Commands::Get { key } => {
            println!("{}", client.get_line(&key)?.value);
        }
        Commands::Set { key, value } => {
            client.set_line(&key, &value)?;
            println!("OK");
        }
        Commands::Del { key } => {
            let existed = client.delete_line(&key)?;
            println!("{}", if existed { "1" } else { "0" });
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
        Commands::List => {
            for line in client.lines() {
                let line = line?;
                println!("{}\t{}", line.key, line.value);
            }
        }
    }
    Ok(())
}
