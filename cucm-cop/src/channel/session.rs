//! Send/await session over an interactive shell stream.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use log::{debug, trace, warn};

use super::buffer::OutputBuffer;
use super::patterns::{PatternSet, PromptMatch};
use crate::error::{ChannelError, Result};
use crate::transcript::TranscriptSink;

/// A bidirectional text stream to the device's interactive shell.
///
/// The SSH transport provides the production implementation; tests drive the
/// upgrade drivers with scripted in-memory streams.
pub trait ShellStream: Send {
    /// Write raw bytes to the shell.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next chunk of output. `Ok(None)` means the shell closed.
    fn read_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Close the stream.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Interactive session that sends one line and waits for one of a set of
/// prompts, strictly alternating.
///
/// Output is accumulated from the last [`send`](Self::send) until a prompt
/// matches; the next send starts a fresh buffer.
pub struct ChannelSession<S> {
    stream: S,
    buffer: OutputBuffer,
    transcript: Option<Box<dyn TranscriptSink>>,
}

impl<S: ShellStream> ChannelSession<S> {
    /// Wrap an already-open shell stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: OutputBuffer::new(),
            transcript: None,
        }
    }

    /// Mirror all channel traffic to a transcript sink.
    pub fn with_transcript(mut self, sink: Box<dyn TranscriptSink>) -> Self {
        self.transcript = Some(sink);
        self
    }

    /// Send a line (a newline is appended) and reset the output buffer.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        debug!("send: {:?}", line);
        self.record_sent(line);
        self.buffer.reset(Some(line));
        self.write_line(line).await
    }

    /// Send a line that must never appear in logs or the transcript.
    pub async fn send_hidden(&mut self, line: &str) -> Result<()> {
        debug!("send: ********");
        self.record_sent("********");
        self.buffer.reset(None);
        self.write_line(line).await
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.stream.write(&data).await
    }

    /// Wait until the output since the last send matches one of `patterns`.
    ///
    /// Fails with [`ChannelError::PatternTimeout`] when nothing matched
    /// within `timeout`, or [`ChannelError::Closed`] when the shell went away.
    pub async fn await_pattern(
        &mut self,
        patterns: &PatternSet,
        timeout: Duration,
    ) -> Result<PromptMatch> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(found) = patterns.find(self.buffer.text()) {
                debug!("matched '{}' after {} bytes", found.name, self.buffer.raw_len());
                return Ok(found);
            }

            let chunk = match tokio::time::timeout_at(deadline, self.stream.read_chunk()).await {
                Ok(chunk) => chunk?,
                Err(_) => {
                    debug!("timeout waiting for {}", patterns.describe());
                    return Err(ChannelError::PatternTimeout {
                        waiting_for: patterns.describe(),
                        timeout,
                    }
                    .into());
                }
            };

            let Some(chunk) = chunk else {
                return Err(ChannelError::Closed.into());
            };

            trace!("received {} bytes", chunk.len());
            if let Some(sink) = self.transcript.as_mut() {
                if let Err(e) = sink.received(&chunk) {
                    warn!("Failed to write transcript: {}", e);
                }
            }
            self.buffer.extend(&chunk);
        }
    }

    /// Send a command and wait for one of `prompt`.
    pub async fn command(
        &mut self,
        command: &str,
        prompt: &PatternSet,
        timeout: Duration,
    ) -> Result<PromptMatch> {
        self.send(command).await?;
        self.await_pattern(prompt, timeout).await
    }

    /// Cleaned output since the last send.
    pub fn output(&self) -> &str {
        self.buffer.text()
    }

    /// Close the stream and drop the transcript sink.
    pub async fn close(mut self) -> Result<()> {
        if let Some(mut sink) = self.transcript.take() {
            if let Err(e) = sink.flush() {
                warn!("Failed to flush transcript: {}", e);
            }
        }
        self.stream.close().await
    }

    fn record_sent(&mut self, line: &str) {
        if let Some(sink) = self.transcript.as_mut() {
            if let Err(e) = sink.sent(line) {
                warn!("Failed to write transcript: {}", e);
            }
        }
    }
}
