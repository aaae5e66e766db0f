//! Channel layer for pattern matching and shell I/O.
//!
//! This module handles the interactive session management,
//! including prompt pattern sets and escape-sequence cleaning.

mod buffer;
mod patterns;
mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use buffer::OutputBuffer;
pub use patterns::{PatternSet, PromptMatch, find_file_index, leading_index};
pub use session::{ChannelSession, ShellStream};
