//! In-memory line store
//!
//! BTreeMap-based store with RwLock for concurrency. Ordered keys make
//! cursor pagination a range scan.

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;

use super::LineStore;
use crate::config::DEFAULT_MAX_KEY_LEN;
use crate::error::{LineError, Result};
use crate::line::{validate_key, validate_line, Line, Page};
use crate::protocol::MAX_PAYLOAD_SIZE;

/// Thread-safe in-memory store of lines
#[derive(Debug)]
pub struct MemoryStore {
    lines: RwLock<BTreeMap<String, String>>,

    /// Longest key accepted through [`LineStore`]
    max_key_len: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_max_key_len(DEFAULT_MAX_KEY_LEN)
    }
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store with a custom key limit
    pub fn with_max_key_len(max_key_len: usize) -> Self {
        Self {
            lines: RwLock::new(BTreeMap::new()),
            max_key_len,
        }
    }

    /// Store or overwrite a line (write lock)
    pub fn set(&self, key: &str, value: &str) {
        self.lines.write().insert(key.to_string(), value.to_string());
    }

    /// Get a line's value (read lock)
    pub fn get(&self, key: &str) -> Option<String> {
        self.lines.read().get(key).cloned()
    }

    /// Remove a line (write lock)
    pub fn delete(&self, key: &str) -> bool {
        self.lines.write().remove(key).is_some()
    }

    /// Collect one page of lines after `start_after`
    ///
    /// A page holds at most `limit` lines and, once it has one line, stops
    /// before its bincode encoding would exceed `MAX_PAYLOAD_SIZE`.
    /// `next` is set only when more lines remain beyond this page.
    pub fn list(&self, start_after: Option<&str>, limit: u32) -> Result<Page> {
        let lines = self.lines.read();
        let lower = match start_after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };

        let mut page = Page::default();
        let mut size = bincode::serialized_size(&page)?;

        for (key, value) in lines.range::<str, _>((lower, Bound::Unbounded)) {
            let line = Line::new(key.as_str(), value.as_str());
            // A cursor naming this line's key would be added if it ends the page
            let cost = bincode::serialized_size(&line)? + bincode::serialized_size(key)?;

            let full = page.lines.len() >= limit as usize
                || (!page.lines.is_empty() && size + cost > u64::from(MAX_PAYLOAD_SIZE));
            if full {
                page.next = page.lines.last().map(|l| l.key.clone());
                break;
            }

            size += bincode::serialized_size(&line)?;
            page.lines.push(line);
        }

        Ok(page)
    }

    /// Number of lines stored
    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }
}

impl LineStore for MemoryStore {
    fn set_line(&mut self, key: &str, value: &str) -> Result<()> {
        validate_line(key, value, self.max_key_len)
            .map_err(|v| LineError::Write(v.to_string()))?;
        self.set(key, value);
        Ok(())
    }

    fn get_line(&mut self, key: &str) -> Result<Line> {
        validate_key(key, self.max_key_len).map_err(|v| LineError::Read(v.to_string()))?;
        self.get(key)
            .map(|value| Line::new(key, value))
            .ok_or_else(|| LineError::NotFound(key.to_string()))
    }

    fn delete_line(&mut self, key: &str) -> Result<bool> {
        validate_key(key, self.max_key_len).map_err(|v| LineError::Write(v.to_string()))?;
        Ok(self.delete(key))
    }

    fn page(&mut self, start_after: Option<&str>, limit: u32) -> Result<Page> {
        self.list(start_after, limit)
    }
}
