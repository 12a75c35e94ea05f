//! Response definitions
//!
//! Represents responses to clients.

use crate::error::Result;
use crate::line::Page;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for GET, page for LIST, error message for ERROR)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an OK response carrying a bincode-encoded page
    pub fn page(page: &Page) -> Result<Self> {
        Ok(Self::ok(Some(bincode::serialize(page)?)))
    }

    /// Decode the payload of a LIST response
    pub fn to_page(&self) -> Result<Page> {
        match &self.payload {
            Some(bytes) => Ok(bincode::deserialize(bytes)?),
            None => Ok(Page::default()),
        }
    }

    /// Payload as text (lossy), empty if absent
    pub fn text(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }
}
