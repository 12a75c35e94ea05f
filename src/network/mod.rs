//! Network Module
//!
//! TCP server serving a [`MemoryStore`](crate::store::MemoryStore).
//!
//! ## Architecture
//! - Single non-blocking acceptor loop
//! - One thread per connection, bounded by `max_connections`
//! - Commands applied directly to the shared store

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
