//! TCP Server
//!
//! Accepts connections and serves each on its own thread.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;

use super::Connection;
use crate::config::ServerConfig;
use crate::error::{LineError, Result};
use crate::protocol::{write_response, Response};
use crate::store::MemoryStore;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Streams of live connections, keyed by connection id
type Registry = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// TCP server for a line store
pub struct Server {
    config: ServerConfig,
    store: Arc<MemoryStore>,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    live: Registry,
}

/// Stops a running [`Server`] from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to shut down gracefully
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Server {
    /// Bind the listener described by `config`
    pub fn bind(config: ServerConfig, store: Arc<MemoryStore>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            LineError::Connection(format!("cannot bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Listening on {}", local_addr);

        Ok(Self {
            config,
            store,
            listener,
            local_addr,
            shutdown: Arc::new(AtomicBool::new(false)),
            live: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle that stops [`Server::run`]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Run the accept loop (blocking)
    ///
    /// Returns after shutdown is signalled and every connection thread has exited.
    pub fn run(&self) -> Result<()> {
        let wait_group = WaitGroup::new();
        let mut next_id: u64 = 0;

        while !self.shutdown.load(Ordering::SeqCst) {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if let Err(e) = stream.set_nonblocking(false) {
                tracing::warn!("Dropping connection from {}: {}", peer, e);
                continue;
            }

            if self.live.lock().len() >= self.config.max_connections {
                tracing::warn!(
                    "Rejecting {}: {} connections open",
                    peer,
                    self.config.max_connections
                );
                reject(stream);
                continue;
            }

            next_id += 1;
            if let Err(e) = self.spawn_connection(next_id, stream, wait_group.clone()) {
                tracing::warn!("Failed to start connection from {}: {}", peer, e);
            }
        }

        tracing::info!("Shutting down, closing {} connections", self.live.lock().len());
        for stream in self.live.lock().values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        wait_group.wait();

        Ok(())
    }

    fn spawn_connection(&self, id: u64, stream: TcpStream, wait_group: WaitGroup) -> Result<()> {
        self.live.lock().insert(id, stream.try_clone()?);

        let mut conn = match Connection::new(stream, Arc::clone(&self.store), self.config.max_key_len)
            .and_then(|mut conn| {
                conn.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;
                Ok(conn)
            }) {
            Ok(conn) => conn,
            Err(e) => {
                self.live.lock().remove(&id);
                return Err(e);
            }
        };

        let live = Arc::clone(&self.live);
        let spawned = thread::Builder::new()
            .name(format!("linestore-conn-{}", id))
            .spawn(move || {
                if let Err(e) = conn.handle() {
                    tracing::debug!("Connection {} ended with error: {}", conn.peer_addr(), e);
                }
                live.lock().remove(&id);
                drop(wait_group);
            });

        if let Err(e) = spawned {
            self.live.lock().remove(&id);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Tell an over-limit client why it is being turned away
fn reject(mut stream: TcpStream) {
    let _ = stream.set_write_timeout(Some(Duration::from_millis(500)));
    let _ = write_response(&mut stream, &Response::error("too many connections"));
    let _ = stream.shutdown(Shutdown::Both);
}
