//! Output buffer that keeps the cleaned text received since the last send.
//!
//! Raw bytes from the shell are run through a `vte` parser so that escape
//! sequences, carriage returns and other control characters never reach the
//! pattern matcher. The echo of the last sent line is hidden from callers,
//! otherwise a command such as `utils system restart` would satisfy a
//! `restart` prompt pattern on its own echo.

use vte::{Parser, Perform};

/// Accumulates cleaned shell output between two sends.
pub struct OutputBuffer {
    parser: Parser,
    text: CleanText,
    echo: Option<String>,
    raw_len: usize,
}

impl OutputBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            text: CleanText::default(),
            echo: None,
            raw_len: 0,
        }
    }

    /// Feed raw bytes from the shell.
    pub fn extend(&mut self, data: &[u8]) {
        self.raw_len += data.len();
        self.parser.advance(&mut self.text, data);
    }

    /// Drop accumulated output and remember the line that was just sent.
    ///
    /// `echo` is `None` for hidden input, which the device does not echo.
    pub fn reset(&mut self, echo: Option<&str>) {
        self.text.0.clear();
        self.raw_len = 0;
        self.echo = echo
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string);
    }

    /// Cleaned output since the last send, without the echoed input.
    ///
    /// Late output of the previous step that arrived ahead of the echo line
    /// is dropped together with it. The echo may share its line with a late
    /// prompt, as in `admin:utils system restart`.
    pub fn text(&self) -> &str {
        let text = self.text.0.as_str();
        let Some(echo) = &self.echo else {
            return text;
        };

        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            offset += line.len();
            if is_echo_line(line, echo) {
                return text[offset..].trim_start_matches([' ', '\n']);
            }
        }
        text
    }

    /// Number of raw bytes received since the last send.
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Check if nothing has been received since the last send.
    pub fn is_empty(&self) -> bool {
        self.text.0.is_empty()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("text", &self.text.0)
            .field("echo", &self.echo)
            .field("raw_len", &self.raw_len)
            .finish()
    }
}

/// A line is the echo when it ends with the sent text and nothing but a
/// non-word character (prompt punctuation or a space) precedes it.
fn is_echo_line(line: &str, echo: &str) -> bool {
    let line = line.trim();
    match line.strip_suffix(echo) {
        Some(head) => head
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric()),
        None => false,
    }
}

/// `vte` performer that keeps printable characters and line feeds.
#[derive(Debug, Default)]
struct CleanText(String);

impl Perform for CleanText {
    fn print(&mut self, c: char) {
        self.0.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.0.push('\n'),
            b'\t' => self.0.push(' '),
            // backspace
            0x08 => {
                if !self.0.ends_with('\n') {
                    self.0.pop();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.text(), "Hello, world!");
        assert_eq!(buffer.raw_len(), 13);
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"\x1b[32mGreen text\x1b[0m\r\nadmin:");
        assert_eq!(buffer.text(), "Green text\nadmin:");
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"before \x1b[1");
        buffer.extend(b";31mafter");
        assert_eq!(buffer.text(), "before after");
    }

    #[test]
    fn test_echo_is_hidden() {
        let mut buffer = OutputBuffer::new();
        buffer.reset(Some("utils system restart"));
        buffer.extend(b"utils system restart\r\n");
        assert_eq!(buffer.text(), "");
        buffer.extend(b"Do you really want to restart ?\r\nEnter (yes/no)?");
        assert_eq!(
            buffer.text(),
            "Do you really want to restart ?\nEnter (yes/no)?"
        );
    }

    #[test]
    fn test_late_output_before_echo() {
        let mut buffer = OutputBuffer::new();
        buffer.reset(Some("yes"));
        buffer.extend(b"ciscocm.k3.cop.sgn\r\nyes\r\nEnter (yes/no)?");
        assert_eq!(buffer.text(), "Enter (yes/no)?");
    }

    #[test]
    fn test_echo_after_late_prompt_on_same_line() {
        let mut buffer = OutputBuffer::new();
        buffer.reset(Some("utils system restart"));
        buffer.extend(b"admin:utils system restart\r\n");
        assert_eq!(buffer.text(), "");
        buffer.extend(b"Do you really want to restart ?\r\nEnter (yes/no)?");
        assert_eq!(
            buffer.text(),
            "Do you really want to restart ?\nEnter (yes/no)?"
        );
    }

    #[test]
    fn test_echo_suffix_needs_word_boundary() {
        let mut buffer = OutputBuffer::new();
        buffer.reset(Some("no"));
        buffer.extend(b"Upgrade cannot continue with option piano\nEnter (yes/no)?");
        assert_eq!(
            buffer.text(),
            "Upgrade cannot continue with option piano\nEnter (yes/no)?"
        );
    }

    #[test]
    fn test_echo_not_taken_from_prompt_text() {
        let mut buffer = OutputBuffer::new();
        buffer.reset(Some("yes"));
        buffer.extend(b"Enter (yes/no)?");
        assert_eq!(buffer.text(), "Enter (yes/no)?");
    }

    #[test]
    fn test_reset_clears_output() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"old output\nadmin:");
        buffer.reset(None);
        assert!(buffer.is_empty());
        assert_eq!(buffer.raw_len(), 0);
    }

    #[test]
    fn test_backspace_erases() {
        let mut buffer = OutputBuffer::new();
        buffer.extend(b"abc\x08d");
        assert_eq!(buffer.text(), "abd");
    }
}
