//! Paginated line iteration
//!
//! Walks the whole store one LIST request at a time, using the client's
//! configured page size.

use std::collections::VecDeque;

use super::Client;
use crate::error::Result;
use crate::line::Line;

/// Iterator over all lines in key order
///
/// Yields `Err` once and then stops if a page request fails.
pub struct LineIter<'a> {
    client: &'a mut Client,
    buffer: VecDeque<Line>,
    cursor: Option<String>,
    done: bool,
    pages_fetched: usize,
}

impl<'a> LineIter<'a> {
    pub(super) fn new(client: &'a mut Client) -> Self {
        Self {
            client,
            buffer: VecDeque::new(),
            cursor: None,
            done: false,
            pages_fetched: 0,
        }
    }

    /// Number of LIST requests issued so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fill(&mut self) -> Result<()> {
        let limit = self.client.config().page_size;
        let page = self.client.fetch_page(self.cursor.as_deref(), limit)?;
        self.pages_fetched += 1;

        tracing::trace!(
            "Fetched page {} with {} lines",
            self.pages_fetched,
            page.lines.len()
        );

        self.done = page.next.is_none() || page.lines.is_empty();
        self.cursor = page.next;
        self.buffer.extend(page.lines);
        Ok(())
    }
}

impl Iterator for LineIter<'_> {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.buffer.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}
