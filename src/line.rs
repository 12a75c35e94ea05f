//! Line definitions
//!
//! A line is a single key/value entry in the store. The value is an opaque
//! string; callers own its serialization.

use serde::{Deserialize, Serialize};

use crate::protocol::MAX_PAYLOAD_SIZE;

/// A single key/value entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Unique identifier of the line
    pub key: String,

    /// Opaque payload
    pub value: String,
}

impl Line {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One batch of lines returned by a LIST request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Lines in ascending key order
    pub lines: Vec<Line>,

    /// Key to resume after; `None` on the last page
    pub next: Option<String>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Longest key any store accepts, whatever its configured limit
pub const MAX_KEY_LEN: usize = 64 * 1024;

/// Longest value any store accepts.
///
/// Leaves room under `MAX_PAYLOAD_SIZE` for a key and page framing, so a
/// single line always fits in one LIST response.
pub const MAX_VALUE_LEN: usize = MAX_PAYLOAD_SIZE as usize - 4 * MAX_KEY_LEN;

/// Reasons a line is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    EmptyKey,
    KeyTooLong { len: usize, max: usize },
    ValueTooLong { len: usize, max: usize },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::EmptyKey => write!(f, "key must not be empty"),
            Violation::KeyTooLong { len, max } => {
                write!(f, "key is {} bytes (max {})", len, max)
            }
            Violation::ValueTooLong { len, max } => {
                write!(f, "value is {} bytes (max {})", len, max)
            }
        }
    }
}

/// Check a key against the store's rules
///
/// `max_len` is capped at [`MAX_KEY_LEN`].
pub fn validate_key(key: &str, max_len: usize) -> std::result::Result<(), Violation> {
    let max = max_len.min(MAX_KEY_LEN);
    if key.is_empty() {
        return Err(Violation::EmptyKey);
    }
    if key.len() > max {
        return Err(Violation::KeyTooLong {
            len: key.len(),
            max,
        });
    }
    Ok(())
}

/// Check a key and value before storing them
pub fn validate_line(key: &str, value: &str, max_key_len: usize) -> std::result::Result<(), Violation> {
    validate_key(key, max_key_len)?;
    if value.len() > MAX_VALUE_LEN {
        return Err(Violation::ValueTooLong {
            len: value.len(),
            max: MAX_VALUE_LEN,
        });
    }
    Ok(())
}
