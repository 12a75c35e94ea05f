//! Client Module
//!
//! Blocking TCP client for a remote line store.
//!
//! ## Lifecycle
//! ```text
//!   connect(config) ──► Open ──close()/drop/transport failure──► Closed
//! ```
//!
//! Every call is a single request/response round trip on one connection.
//! Methods take `&mut self`; share a client across threads only behind a
//! lock such as `Mutex<Client>`.

mod remote;
mod iter;

pub use remote::Client;
pub use iter::LineIter;
