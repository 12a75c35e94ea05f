//! Remote client
//!
//! Owns one TCP connection to a line server.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use super::LineIter;
use crate::config::Config;
use crate::error::{is_timeout_kind, LineError, Result};
use crate::line::{validate_key, validate_line, Line, Page};
use crate::protocol::{read_response, write_command, Command, Response, Status};
use crate::store::LineStore;

/// Expected payload of a PING response
const PONG: &[u8] = b"PONG";

/// Buffered halves of an open connection
struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    peer_addr: SocketAddr,
}

/// Handle to a remote line store
///
/// Created by [`Client::connect`], released by [`Client::close`] or on drop.
pub struct Client {
    config: Config,

    /// `None` once closed
    conn: Option<Connection>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("addr", &self.config.addr)
            .field("page_size", &self.config.page_size)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl Client {
    /// Connect to the store named in `config`
    ///
    /// Steps:
    /// 1. Validate the configuration
    /// 2. Resolve the address and open a TCP connection
    /// 3. Apply per-call timeouts
    /// 4. PING handshake
    pub fn connect(config: Config) -> Result<Self> {
        config.validate()?;

        let stream = open_stream(&config)?;
        let peer_addr = stream.peer_addr()?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        let read_stream = stream.try_clone()?;
        let mut client = Self {
            config,
            conn: Some(Connection {
                reader: BufReader::new(read_stream),
                writer: BufWriter::new(stream),
                peer_addr,
            }),
        };

        if let Err(e) = client.ping() {
            client.close();
            return Err(match e {
                LineError::Timeout(_) => e,
                other => LineError::Connection(format!("handshake failed: {}", other)),
            });
        }

        tracing::debug!(
            "Connected to {} (page_size={})",
            peer_addr,
            client.config.page_size
        );
        Ok(client)
    }

    /// Store or overwrite the line identified by `key`
    pub fn set_line(&mut self, key: &str, value: &str) -> Result<()> {
        validate_line(key, value, self.config.max_key_len)
            .map_err(|v| LineError::Write(v.to_string()))?;

        let response = self
            .call(Command::Set {
                key: key.to_string(),
                value: value.to_string(),
            })
            .map_err(|e| classify(e, LineError::Write))?;

        match response.status {
            Status::Ok => Ok(()),
            Status::NotFound => Err(LineError::Write(format!(
                "unexpected NOT_FOUND storing {:?}",
                key
            ))),
            Status::Error => Err(LineError::Write(response.text())),
        }
    }

    /// Fetch the line identified by `key`
    pub fn get_line(&mut self, key: &str) -> Result<Line> {
        validate_key(key, self.config.max_key_len)
            .map_err(|v| LineError::Read(v.to_string()))?;

        let response = self
            .call(Command::Get {
                key: key.to_string(),
            })
            .map_err(|e| classify(e, LineError::Read))?;

        match response.status {
            Status::Ok => {
                let value = String::from_utf8(response.payload.unwrap_or_default())
                    .map_err(|e| LineError::Read(format!("value is not UTF-8: {}", e)))?;
                Ok(Line::new(key, value))
            }
            Status::NotFound => Err(LineError::NotFound(key.to_string())),
            Status::Error => Err(LineError::Read(response.text())),
        }
    }

    /// Remove the line identified by `key`; returns whether it existed
    pub fn delete_line(&mut self, key: &str) -> Result<bool> {
        validate_key(key, self.config.max_key_len)
            .map_err(|v| LineError::Write(v.to_string()))?;

        let response = self
            .call(Command::Delete {
                key: key.to_string(),
            })
            .map_err(|e| classify(e, LineError::Write))?;

        match response.status {
            Status::Ok => Ok(true),
            Status::NotFound => Ok(false),
            Status::Error => Err(LineError::Write(response.text())),
        }
    }

    /// Round trip health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.call(Command::Ping).map_err(|e| classify(e, LineError::Read))?;

        match (response.status, response.payload.as_deref()) {
            (Status::Ok, Some(PONG)) => Ok(()),
            (Status::Error, _) => Err(LineError::Read(response.text())),
            _ => Err(LineError::Protocol(format!(
                "unexpected PING reply: {:?}",
                response
            ))),
        }
    }

    /// Fetch up to `limit` lines with keys strictly after `start_after`
    pub fn fetch_page(&mut self, start_after: Option<&str>, limit: u32) -> Result<Page> {
        let response = self
            .call(Command::List {
                start_after: start_after.map(str::to_string),
                limit,
            })
            .map_err(|e| classify(e, LineError::Read))?;

        match response.status {
            Status::Ok => response
                .to_page()
                .map_err(|e| LineError::Read(format!("malformed page: {}", e))),
            Status::NotFound => Err(LineError::Protocol(
                "unexpected NOT_FOUND for LIST".to_string(),
            )),
            Status::Error => Err(LineError::Read(response.text())),
        }
    }

    /// Iterate over every line in key order, `page_size` lines per request
    pub fn lines(&mut self) -> LineIter<'_> {
        LineIter::new(self)
    }

    /// Release the connection
    ///
    /// Idempotent; never fails. Also run on drop.
    pub fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let _ = conn.writer.flush();
            let _ = conn.writer.get_ref().shutdown(Shutdown::Both);
            tracing::debug!("Closed connection to {}", conn.peer_addr);
        }
    }

    /// Whether the connection has been released
    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Address of the connected server, if open
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.conn.as_ref().map(|c| c.peer_addr)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send one command and wait for its response
    ///
    /// A transport failure leaves the stream out of sync, so it closes the client.
    fn call(&mut self, command: Command) -> Result<Response> {
        let conn = self.conn.as_mut().ok_or(LineError::Closed)?;
        tracing::trace!("Sending {:?} to {}", command.command_type(), conn.peer_addr);

        let result = write_command(&mut conn.writer, &command)
            .and_then(|_| read_response(&mut conn.reader));

        if let Err(ref e) = result {
            tracing::debug!("Transport failure on {}: {}", conn.peer_addr, e);
            self.close();
        }
        result
    }
}

impl LineStore for Client {
    fn set_line(&mut self, key: &str, value: &str) -> Result<()> {
        Client::set_line(self, key, value)
    }

    fn get_line(&mut self, key: &str) -> Result<Line> {
        Client::get_line(self, key)
    }

    fn delete_line(&mut self, key: &str) -> Result<bool> {
        Client::delete_line(self, key)
    }

    fn page(&mut self, start_after: Option<&str>, limit: u32) -> Result<Page> {
        self.fetch_page(start_after, limit)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

/// Resolve `config.addr` and connect to the first reachable address
fn open_stream(config: &Config) -> Result<TcpStream> {
    let addrs: Vec<SocketAddr> = config
        .addr
        .to_socket_addrs()
        .map_err(|e| LineError::Connection(format!("cannot resolve {}: {}", config.addr, e)))?
        .collect();

    let mut last_err = None;
    for addr in &addrs {
        let attempt = match config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(e) if is_timeout_kind(e.kind()) => {
            LineError::Timeout(format!("connecting to {}", config.addr))
        }
        Some(e) => LineError::Connection(format!("cannot reach {}: {}", config.addr, e)),
        None => LineError::Connection(format!("{} resolved to no addresses", config.addr)),
    })
}

/// Map a transport error into the operation's error category
///
/// Timeouts and closed handles keep their own variants.
fn classify(e: LineError, op: fn(String) -> LineError) -> LineError {
    match e {
        LineError::Closed | LineError::Timeout(_) => e,
        LineError::Io(ref io) if is_timeout_kind(io.kind()) => LineError::Timeout(io.to_string()),
        other => op(other.to_string()),
    }
}
