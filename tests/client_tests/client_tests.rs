//! Tests for Client
//!
//! These tests verify:
//! - Connect / handshake and connection failures
//! - set_line / get_line / delete_line against a live server
//! - Error classification (write, read, not found, timeout, closed)
//! - Paginated iteration honours the configured page size
//! - Close is idempotent and transport failures close the handle

#[path = "../common/mod.rs"]
mod common;

use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use common::{unused_addr, TestServer};
use linestore::line::MAX_VALUE_LEN;
use linestore::protocol::{
    read_command, read_response, write_command, write_response, Command, Response, Status,
};
use linestore::network::Server;
use linestore::{Client, Config, Line, LineError, LineStore, MemoryStore, ServerConfig};

// =============================================================================
// Connect Tests
// =============================================================================

#[test]
fn test_connect_and_ping() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    assert!(!client.is_closed());
    assert_eq!(client.peer_addr(), Some(server.addr));
    client.ping().unwrap();
}

#[test]
fn test_connect_unreachable_is_connection_error() {
    let config = Config::builder()
        .addr(unused_addr().to_string())
        .connect_timeout_ms(1000)
        .build();

    let err = Client::connect(config).unwrap_err();
    assert!(matches!(err, LineError::Connection(_)), "got {:?}", err);
}

#[test]
fn test_connect_unresolvable_is_connection_error() {
    let config = Config::builder().addr("not an address").build();

    let err = Client::connect(config).unwrap_err();
    assert!(matches!(err, LineError::Connection(_)), "got {:?}", err);
}

#[test]
fn test_connect_rejects_zero_page_size() {
    let server = TestServer::start();
    let err = Client::connect(server.config().page_size(0).build()).unwrap_err();
    assert!(matches!(err, LineError::Config(_)));
}

#[test]
fn test_handshake_timeout() {
    // Accepts at the TCP level (backlog) but never answers the PING
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = Config::builder()
        .addr(listener.local_addr().unwrap().to_string())
        .read_timeout_ms(100)
        .build();

    let err = Client::connect(config).unwrap_err();
    assert!(err.is_timeout(), "got {:?}", err);
}

#[test]
fn test_server_connection_limit_rejects_handshake() {
    let server = TestServer::start_with(ServerConfig::builder().max_connections(1));
    let _first = Client::connect(server.config().build()).unwrap();

    let err = Client::connect(server.config().build()).unwrap_err();
    assert!(matches!(err, LineError::Connection(_)), "got {:?}", err);
}

// =============================================================================
// Line Operation Tests
// =============================================================================

#[test]
fn test_set_get() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    client.set_line("hello", "world").unwrap();
    assert_eq!(client.get_line("hello").unwrap(), Line::new("hello", "world"));
    assert_eq!(server.store.get("hello"), Some("world".to_string()));
}

#[test]
fn test_last_write_wins() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    client.set_line("k", "first").unwrap();
    client.set_line("k", "second").unwrap();
    assert_eq!(client.get_line("k").unwrap().value, "second");
}

#[test]
fn test_empty_value_roundtrip() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    client.set_line("blank", "").unwrap();
    assert_eq!(client.get_line("blank").unwrap().value, "");
}

#[test]
fn test_get_missing_is_not_found() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    let err = client.get_line("never-written").unwrap_err();
    assert!(matches!(err, LineError::NotFound(ref k) if k == "never-written"));
    assert!(!client.is_closed());
}

#[test]
fn test_delete_then_get_is_not_found() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    client.set_line("gone", "soon").unwrap();
    assert!(client.delete_line("gone").unwrap());
    assert!(!client.delete_line("gone").unwrap());
    assert!(client.get_line("gone").unwrap_err().is_not_found());
}

#[test]
fn test_empty_key_set_is_write_error() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    let err = client.set_line("", "value").unwrap_err();
    assert!(matches!(err, LineError::Write(_)));
    assert!(!client.is_closed());
}

#[test]
fn test_empty_key_get_is_read_error() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    let err = client.get_line("").unwrap_err();
    assert!(matches!(err, LineError::Read(_)));
}

#[test]
fn test_client_key_limit() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().max_key_len(4).build()).unwrap();

    let err = client.set_line("too-long", "v").unwrap_err();
    assert!(err.to_string().contains("max 4"));
}

#[test]
fn test_remote_rejection_is_write_error() {
    let server = TestServer::start_with(ServerConfig::builder().max_key_len(4));
    let mut client = Client::connect(server.config().build()).unwrap();

    let err = client.set_line("longer-than-four", "v").unwrap_err();
    match err {
        LineError::Write(msg) => assert!(msg.contains("max 4"), "{}", msg),
        other => panic!("Expected write error, got {:?}", other),
    }
    // The remote refused the request but the stream is still in sync
    client.set_line("ok", "v").unwrap();
}

#[test]
fn test_oversized_value_is_write_error_and_keeps_client_open() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    let err = client.set_line("big", &"v".repeat(MAX_VALUE_LEN + 1)).unwrap_err();
    assert!(matches!(err, LineError::Write(_)), "got {:?}", err);
    assert!(!client.is_closed());
    client.ping().unwrap();
    assert!(server.store.is_empty());
}

#[test]
fn test_server_refuses_oversized_value() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    let command = Command::Set {
        key: "big".to_string(),
        value: "v".repeat(MAX_VALUE_LEN + 1),
    };
    write_command(&mut stream, &command).unwrap();
    let response = read_response(&mut stream).unwrap();

    assert_eq!(response.status, Status::Error);
    assert!(response.text().contains("value is"), "{}", response.text());
    assert!(server.store.is_empty());
}

// =============================================================================
// Pagination Tests
// =============================================================================

#[test]
fn test_lines_uses_page_size() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().page_size(2).build()).unwrap();

    for key in ["e", "c", "a", "d", "b"] {
        client.set_line(key, &key.to_uppercase()).unwrap();
    }

    let mut iter = client.lines();
    let lines: Vec<Line> = iter.by_ref().collect::<linestore::Result<_>>().unwrap();
    assert_eq!(iter.pages_fetched(), 3);
    drop(iter);

    let keys: Vec<_> = lines.iter().map(|l| l.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(lines[2], Line::new("c", "C"));
}

#[test]
fn test_lines_on_empty_store() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    assert_eq!(client.lines().count(), 0);
}

#[test]
fn test_page_through_trait() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();
    for key in ["a", "b", "c"] {
        client.set_line(key, "v").unwrap();
    }

    let page = LineStore::page(&mut client, Some("a"), 1).unwrap();
    assert_eq!(page.lines, vec![Line::new("b", "v")]);
    assert_eq!(page.next.as_deref(), Some("b"));
}

#[test]
fn test_lines_splits_pages_too_large_for_one_frame() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().page_size(2).build()).unwrap();
    let big = "x".repeat(9 * 1024 * 1024);
    client.set_line("a", &big).unwrap();
    client.set_line("b", &big).unwrap();

    let mut iter = client.lines();
    let lines: Vec<Line> = iter.by_ref().collect::<linestore::Result<_>>().unwrap();
    assert_eq!(iter.pages_fetched(), 2);
    drop(iter);

    let keys: Vec<_> = lines.iter().map(|l| l.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert!(lines.iter().all(|l| l.value.len() == big.len()));
    assert!(!client.is_closed());
    client.ping().unwrap();
}

#[test]
fn test_not_found_reply_to_list_is_protocol_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        assert_eq!(read_command(&mut stream).unwrap(), Command::Ping);
        write_response(&mut stream, &Response::ok(Some(b"PONG".to_vec()))).unwrap();
        assert!(matches!(
            read_command(&mut stream).unwrap(),
            Command::List { .. }
        ));
        write_response(&mut stream, &Response::not_found()).unwrap();
        // Hold the stream open until the client hangs up
        let _ = read_command(&mut stream);
    });

    let mut client = Client::connect(Config::builder().addr(addr.to_string()).build()).unwrap();
    let err = client.fetch_page(None, 10).unwrap_err();
    assert!(matches!(err, LineError::Protocol(_)), "got {:?}", err);
    assert!(!client.is_closed());

    client.close();
    peer.join().unwrap();
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    client.close();
    client.close();
    assert!(client.is_closed());
    assert_eq!(client.peer_addr(), None);
}

#[test]
fn test_operations_after_close_fail_with_closed() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();
    client.close();

    assert!(matches!(client.set_line("k", "v"), Err(LineError::Closed)));
    assert!(matches!(client.get_line("k"), Err(LineError::Closed)));
    assert!(matches!(client.ping(), Err(LineError::Closed)));
    let first = client.lines().next();
    assert!(matches!(first, Some(Err(LineError::Closed))));
}

#[test]
fn test_close_after_failed_operation() {
    let server = TestServer::start();
    let mut client = Client::connect(server.config().build()).unwrap();

    let _ = client.get_line("missing");
    let _ = client.set_line("", "invalid");
    client.close();
    assert!(client.is_closed());
}

#[test]
fn test_transport_failure_closes_client() {
    // Answers the handshake, then hangs up
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        assert_eq!(read_command(&mut stream).unwrap(), Command::Ping);
        write_response(&mut stream, &Response::ok(Some(b"PONG".to_vec()))).unwrap();
    });

    let mut client = Client::connect(Config::builder().addr(addr.to_string()).build()).unwrap();
    peer.join().unwrap();

    let err = client.set_line("k", "v").unwrap_err();
    assert!(matches!(err, LineError::Write(_)), "got {:?}", err);
    assert!(client.is_closed());
    assert!(matches!(client.get_line("k"), Err(LineError::Closed)));
}

#[test]
fn test_handshake_with_wrong_reply_is_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let _ = read_command(&mut stream);
        let _ = write_response(&mut stream, &Response::ok(Some(b"HELLO".to_vec())));
    });

    let err = Client::connect(Config::builder().addr(addr.to_string()).build()).unwrap_err();
    assert!(matches!(err, LineError::Connection(_)), "got {:?}", err);
    peer.join().unwrap();
}

#[test]
fn test_shutdown_handle_stops_server_with_open_client() {
    let config = ServerConfig::builder().listen_addr("127.0.0.1:0").build();
    let server = Server::bind(config, Arc::new(MemoryStore::new())).unwrap();
    let addr = server.local_addr();
    let shutdown = server.shutdown_handle();
    let running = thread::spawn(move || server.run());

    let mut client = Client::connect(Config::builder().addr(addr.to_string()).build()).unwrap();
    client.set_line("k", "v").unwrap();

    shutdown.shutdown();
    running.join().unwrap().unwrap();

    assert!(client.get_line("k").is_err());
    assert!(client.is_closed());
}

// =============================================================================
// Sharing Tests
// =============================================================================

#[test]
fn test_multiple_independent_clients() {
    let server = TestServer::start();
    let mut writer = Client::connect(server.config().build()).unwrap();
    let mut reader = Client::connect(server.config().build()).unwrap();

    writer.set_line("shared", "yes").unwrap();
    assert_eq!(reader.get_line("shared").unwrap().value, "yes");

    writer.close();
    reader.ping().unwrap();
}

#[test]
fn test_shared_client_behind_mutex() {
    let server = TestServer::start();
    let client = Arc::new(Mutex::new(Client::connect(server.config().build()).unwrap()));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                for i in 0..25 {
                    let key = format!("t{}-{}", t, i);
                    let mut client = client.lock().unwrap();
                    client.set_line(&key, &i.to_string()).unwrap();
                    assert_eq!(client.get_line(&key).unwrap().value, i.to_string());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(server.store.len(), 100);
}
