//! Scripted in-memory shell used by the driver tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use super::session::ShellStream;
use crate::error::Result;

/// What the scripted device answers to one input line.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Output delivered as separate chunks.
    Chunks(Vec<String>),
    /// Nothing at all; the next wait will time out.
    Silent,
    /// The device closes the shell.
    Close,
}

impl Reply {
    /// A single chunk of output.
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Chunks(vec![text.into()])
    }

    /// Output split into several chunks.
    pub fn chunks<I, T>(chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Reply::Chunks(chunks.into_iter().map(Into::into).collect())
    }
}

/// Record of everything written to a [`ScriptedShell`].
#[derive(Debug, Clone, Default)]
pub struct SentLog(Arc<Mutex<Vec<String>>>);

impl SentLog {
    /// Raw writes, newline included.
    pub fn raw(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Written lines without the trailing newline.
    pub fn lines(&self) -> Vec<String> {
        self.raw()
            .into_iter()
            .map(|l| l.trim_end_matches('\n').to_string())
            .collect()
    }

    /// How many times `line` was sent.
    pub fn count(&self, line: &str) -> usize {
        self.lines().iter().filter(|l| *l == line).count()
    }

    /// Whether `line` was sent at all.
    pub fn contains(&self, line: &str) -> bool {
        self.count(line) > 0
    }
}

/// In-memory shell that answers expected lines with canned output.
///
/// Script entries are consumed in order; an input that does not match the
/// next expected line gets no answer, so the waiting driver times out.
#[derive(Debug, Default)]
pub struct ScriptedShell {
    script: VecDeque<(String, Reply)>,
    pending: VecDeque<Bytes>,
    closed: bool,
    echo: bool,
    sent: SentLog,
}

impl ScriptedShell {
    /// Create a shell with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Output available before anything is sent (login banner and prompt).
    pub fn greeting(mut self, text: &str) -> Self {
        self.pending.push_back(Bytes::from(text.to_string()));
        self
    }

    /// Echo every input line back, like a real terminal.
    pub fn echoing(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Answer `input` with `reply`.
    pub fn on(mut self, input: &str, reply: Reply) -> Self {
        self.script.push_back((input.to_string(), reply));
        self
    }

    /// Handle to the inputs written so far.
    pub fn sent(&self) -> SentLog {
        self.sent.clone()
    }
}

impl ShellStream for ScriptedShell {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let raw = String::from_utf8_lossy(data).to_string();
        let line = raw.trim_end_matches('\n').to_string();
        self.sent.0.lock().unwrap().push(raw);

        if self.echo && !line.is_empty() {
            self.pending.push_back(Bytes::from(format!("{}\r\n", line)));
        }

        let expected = matches!(self.script.front(), Some((input, _)) if *input == line);
        if expected {
            if let Some((_, reply)) = self.script.pop_front() {
                match reply {
                    Reply::Chunks(chunks) => {
                        self.pending.extend(chunks.into_iter().map(Bytes::from));
                    }
                    Reply::Silent => {}
                    Reply::Close => self.closed = true,
                }
            }
        }
        Ok(())
    }

    async fn read_chunk(&mut self) -> Result<Option<Bytes>> {
        if let Some(chunk) = self.pending.pop_front() {
            return Ok(Some(chunk));
        }
        if self.closed {
            return Ok(None);
        }
        std::future::pending().await
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
