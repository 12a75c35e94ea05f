//! Store Module
//!
//! The `LineStore` trait is the seam application code depends on. It is
//! implemented by the remote [`Client`](crate::client::Client) and by the
//! in-process [`MemoryStore`], which also backs the reference server.

mod memory;

pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::line::{Line, Page};

/// Line-oriented key/value access
pub trait LineStore {
    /// Store or overwrite the line for `key`
    fn set_line(&mut self, key: &str, value: &str) -> Result<()>;

    /// Fetch the line for `key`, failing with `NotFound` if absent
    fn get_line(&mut self, key: &str) -> Result<Line>;

    /// Remove the line for `key`; returns whether it existed
    fn delete_line(&mut self, key: &str) -> Result<bool>;

    /// Up to `limit` lines with keys strictly after `start_after`, in key order
    fn page(&mut self, start_after: Option<&str>, limit: u32) -> Result<Page>;

    /// Serialize `value` as JSON and store it under `key`
    fn set_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set_line(key, &json)
    }

    /// Fetch the line for `key` and deserialize its JSON value
    fn get_json<T: DeserializeOwned>(&mut self, key: &str) -> Result<T>
    where
        Self: Sized,
    {
        let line = self.get_line(key)?;
        Ok(serde_json::from_str(&line.value)?)
    }
}
