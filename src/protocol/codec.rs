//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GET:    key_len (4 bytes) + key
//! - SET:    key_len (4 bytes) + key + value
//! - DELETE: key_len (4 bytes) + key
//! - PING:   empty
//! - LIST:   limit (4 bytes) + has_cursor (1 byte) + [key_len (4 bytes) + key]
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! All integers are big endian. Keys and values are UTF-8.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use super::{Command, Response, Status};
use crate::error::{LineError, Result};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();

    match command {
        Command::Get { key } | Command::Delete { key } => {
            put_key(&mut payload, key);
        }
        Command::Set { key, value } => {
            payload.reserve(4 + key.len() + value.len());
            put_key(&mut payload, key);
            payload.put_slice(value.as_bytes());
        }
        Command::Ping => {}
        Command::List { start_after, limit } => {
            payload.put_u32(*limit);
            match start_after {
                Some(key) => {
                    payload.put_u8(1);
                    put_key(&mut payload, key);
                }
                None => payload.put_u8(0),
            }
        }
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, mut payload) = split_frame(bytes, "command")?;

    let command = match cmd_type {
        0x01 => Command::Get {
            key: take_key(&mut payload, "GET")?,
        },
        0x02 => {
            let key = take_key(&mut payload, "SET")?;
            let value_len = payload.len();
            let value = take_str(&mut payload, value_len, "SET value")?;
            Command::Set { key, value }
        }
        0x03 => Command::Delete {
            key: take_key(&mut payload, "DELETE")?,
        },
        0x04 => Command::Ping,
        0x05 => decode_list_command(&mut payload)?,
        _ => {
            return Err(LineError::Protocol(format!(
                "Unknown command type: 0x{:02x}",
                cmd_type
            )))
        }
    };

    if !payload.is_empty() {
        return Err(LineError::Protocol(format!(
            "{:?} command: {} trailing bytes",
            command.command_type(),
            payload.len()
        )));
    }

    Ok(command)
}

/// Decode LIST command payload
fn decode_list_command(payload: &mut &[u8]) -> Result<Command> {
    if payload.remaining() < 5 {
        return Err(LineError::Protocol(
            "LIST command: missing limit or cursor flag".to_string(),
        ));
    }

    let limit = payload.get_u32();
    let start_after = match payload.get_u8() {
        0 => None,
        1 => Some(take_key(payload, "LIST")?),
        flag => {
            return Err(LineError::Protocol(format!(
                "LIST command: invalid cursor flag 0x{:02x}",
                flag
            )))
        }
    };

    Ok(Command::List { start_after, limit })
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        _ => {
            return Err(LineError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Framing helpers
// =============================================================================

fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(kind);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Validate the header and return (kind, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(LineError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let kind = header.get_u8();
    let payload_len = header.get_u32();
    check_payload_len(payload_len, what)?;

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(LineError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut len_bytes = &header[1..];
    let payload_len = len_bytes.get_u32();
    check_payload_len(payload_len, what)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len as usize];
    message[..HEADER_SIZE].copy_from_slice(&header);
    reader.read_exact(&mut message[HEADER_SIZE..])?;

    Ok(message)
}

fn check_payload_len(payload_len: u32, what: &str) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(LineError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

fn put_key(buf: &mut BytesMut, key: &str) {
    buf.put_u32(key.len() as u32);
    buf.put_slice(key.as_bytes());
}

fn take_key(payload: &mut &[u8], cmd: &str) -> Result<String> {
    if payload.remaining() < 4 {
        return Err(LineError::Protocol(format!(
            "{} command: missing key length",
            cmd
        )));
    }

    let key_len = payload.get_u32() as usize;
    if payload.remaining() < key_len {
        return Err(LineError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            cmd,
            key_len,
            payload.remaining()
        )));
    }

    take_str(payload, key_len, cmd)
}

fn take_str(payload: &mut &[u8], len: usize, what: &str) -> Result<String> {
    let (text, rest) = payload.split_at(len);
    let text = std::str::from_utf8(text)
        .map_err(|e| LineError::Protocol(format!("{}: invalid UTF-8: {}", what, e)))?
        .to_string();
    *payload = rest;
    Ok(text)
}
