//! # LineStore
//!
//! A client for a remote key-value line store:
//! - `set_line` / `get_line` / `delete_line` over a framed TCP protocol
//! - Page-based iteration controlled by a configurable page size
//! - Typed errors for connection, write, read, not-found and timeout failures
//! - JSON helpers for storing application records as line values
//!
//! An in-memory reference server speaking the same protocol is included.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐            ┌──────────────────────────────┐
//! │       Client         │   frames   │           Server             │
//! │ set/get/delete/lines ├───────────►│  accept loop, thread/conn    │
//! └──────────┬───────────┘    TCP     └──────────────┬───────────────┘
//!            │                                       │
//!            │ implements                            ▼
//!            ▼                               ┌───────────────┐
//!     ┌─────────────┐   implements           │  MemoryStore  │
//!     │  LineStore  │◄───────────────────────┤   (RwLock)    │
//!     └─────────────┘                        └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use linestore::{Client, Config};
//!
//! # fn main() -> linestore::Result<()> {
//! let mut client = Client::connect(Config::builder().page_size(2).build())?;
//! client.set_line("greeting", "hello")?;
//! assert_eq!(client.get_line("greeting")?.value, "hello");
//! client.close();
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod line;

pub mod protocol;
pub mod store;
pub mod client;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::{Client, LineIter};
pub use config::{Config, ServerConfig};
pub use error::{LineError, Result};
pub use line::{Line, Page};
pub use store::{LineStore, MemoryStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LineStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
