//! Transcript sinks for raw channel traffic.
//!
//! When logging is enabled for an upgrade, every chunk received from the
//! device and every line sent to it (passwords masked) is appended to a
//! transcript, one file per invocation.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

/// Append-only destination for channel traffic.
pub trait TranscriptSink: Send {
    /// Append a line sent to the device.
    fn sent(&mut self, line: &str) -> io::Result<()>;

    /// Append raw output received from the device.
    ///
    /// Chunk boundaries are arbitrary: a line, or a multi-byte character,
    /// may be split across calls.
    fn received(&mut self, data: &[u8]) -> io::Result<()>;

    /// Write out any partial line and flush buffered data.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reassembles received chunks into complete lines.
#[derive(Debug, Default)]
struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    /// Add a chunk and return the lines it completed. Blank lines are skipped.
    fn push(&mut self, data: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(data);
        let Some(end) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.pending.drain(..=end).collect();
        String::from_utf8_lossy(&complete)
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Take the unterminated rest, such as a prompt waiting for input.
    fn take_partial(&mut self) -> Option<String> {
        let partial = String::from_utf8_lossy(&self.pending)
            .trim_end_matches('\r')
            .to_string();
        self.pending.clear();
        (!partial.trim().is_empty()).then_some(partial)
    }
}

/// Transcript file named `<MM-DD-YYYY>_<address>.log`.
///
/// Every complete line becomes one `<timestamp> - <line>` entry. The file
/// is truncated when created, matching one file per invocation.
pub struct FileTranscript {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: LineAssembler,
}

impl FileTranscript {
    /// Create the transcript for `address` inside `dir`.
    pub fn create(dir: impl AsRef<Path>, address: &str) -> io::Result<Self> {
        let path = dir.as_ref().join(Self::file_name(address));
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            lines: LineAssembler::default(),
        })
    }

    /// File name used for today's transcript of `address`.
    pub fn file_name(address: &str) -> String {
        format!("{}_{}.log", Local::now().format("%m-%d-%Y"), address)
    }

    /// Path of the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        writeln!(self.writer, "{} - {}", stamp, line)
    }

    fn write_partial(&mut self) -> io::Result<()> {
        match self.lines.take_partial() {
            Some(partial) => self.write_line(&partial),
            None => Ok(()),
        }
    }
}

impl TranscriptSink for FileTranscript {
    fn sent(&mut self, line: &str) -> io::Result<()> {
        self.write_partial()?;
        self.write_line(&format!(">>> {}", line))
    }

    fn received(&mut self, data: &[u8]) -> io::Result<()> {
        for line in self.lines.push(data) {
            self.write_line(&line)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_partial()?;
        self.writer.flush()
    }
}

impl std::fmt::Debug for FileTranscript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTranscript").field("path", &self.path).finish()
    }
}

/// In-memory transcript, shared through [`lines`](Self::lines).
#[derive(Debug, Clone, Default)]
pub struct MemoryTranscript {
    lines: Arc<Mutex<Vec<String>>>,
    pending: Arc<Mutex<LineAssembler>>,
}

impl MemoryTranscript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded lines.
    pub fn lines(&self) -> Arc<Mutex<Vec<String>>> {
        self.lines.clone()
    }

    fn append(&self, new_lines: impl IntoIterator<Item = String>) -> io::Result<()> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| io::Error::other("transcript lock poisoned"))?;
        lines.extend(new_lines);
        Ok(())
    }

    fn assembler(&self) -> io::Result<std::sync::MutexGuard<'_, LineAssembler>> {
        self.pending
            .lock()
            .map_err(|_| io::Error::other("transcript lock poisoned"))
    }
}

impl TranscriptSink for MemoryTranscript {
    fn sent(&mut self, line: &str) -> io::Result<()> {
        let partial = self.assembler()?.take_partial();
        self.append(partial.into_iter().chain([format!(">>> {}", line)]))
    }

    fn received(&mut self, data: &[u8]) -> io::Result<()> {
        let complete = self.assembler()?.push(data);
        self.append(complete)
    }

    fn flush(&mut self) -> io::Result<()> {
        let partial = self.assembler()?.take_partial();
        self.append(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cucm-cop-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_name_format() {
        let name = FileTranscript::file_name("10.1.1.10");
        assert!(name.ends_with("_10.1.1.10.log"));
        // MM-DD-YYYY
        let date = name.split('_').next().unwrap();
        assert_eq!(date.len(), 10);
        assert_eq!(date.as_bytes()[2], b'-');
        assert_eq!(date.as_bytes()[5], b'-');
    }

    #[test]
    fn test_file_transcript_writes_timestamped_lines() {
        let dir = scratch_dir("file");
        let mut transcript = FileTranscript::create(&dir, "10.1.1.11").unwrap();
        transcript.sent("show version active").unwrap();
        transcript.received(b"Active Master Version: 11.5.1\r\nadmin:").unwrap();
        transcript.flush().unwrap();

        let content = std::fs::read_to_string(transcript.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" - >>> show version active"));
        assert!(lines[1].ends_with(" - Active Master Version: 11.5.1"));
        assert!(lines[2].ends_with(" - admin:"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_file_transcript_joins_split_lines() {
        let dir = scratch_dir("split");
        let mut transcript = FileTranscript::create(&dir, "10.1.1.12").unwrap();
        let text = "Node café-sub1 ready\r\n".as_bytes();
        // split inside the two-byte 'é' and mid-line
        let cut = text.iter().position(|&b| b == 0xc3).unwrap() + 1;
        transcript.received(&text[..cut]).unwrap();
        transcript.received(&text[cut..]).unwrap();
        transcript.flush().unwrap();

        let content = std::fs::read_to_string(transcript.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" - Node café-sub1 ready"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_memory_transcript() {
        let mut transcript = MemoryTranscript::new();
        let lines = transcript.lines();
        transcript.received(b"Please select an opt").unwrap();
        transcript.received(b"ion:").unwrap();
        transcript.sent("1").unwrap();
        transcript.received(b"Directory:").unwrap();
        assert_eq!(*lines.lock().unwrap(), vec!["Please select an option:", ">>> 1"]);

        transcript.flush().unwrap();
        assert_eq!(
            *lines.lock().unwrap(),
            vec!["Please select an option:", ">>> 1", "Directory:"]
        );
    }
}
