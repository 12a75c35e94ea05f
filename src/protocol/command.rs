//! Command definitions
//!
//! Represents requests sent by clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Set = 0x02,
    Delete = 0x03,
    Ping = 0x04,
    List = 0x05,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a line by key
    Get { key: String },

    /// Store or overwrite a line
    Set { key: String, value: String },

    /// Delete a line
    Delete { key: String },

    /// Ping (health check and handshake)
    Ping,

    /// Fetch up to `limit` lines with keys strictly after `start_after`
    List {
        start_after: Option<String>,
        limit: u32,
    },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
            Command::List { .. } => CommandType::List,
        }
    }

    /// The key this command addresses, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Get { key } | Command::Set { key, .. } | Command::Delete { key } => {
                Some(key.as_str())
            }
            Command::Ping | Command::List { .. } => None,
        }
    }
}
