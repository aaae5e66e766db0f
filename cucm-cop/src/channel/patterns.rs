//! Prompt pattern sets and menu parsing helpers.

use indexmap::IndexMap;
use regex::Regex;

/// An ordered set of named prompt patterns.
///
/// Patterns are evaluated in insertion order and the first one that matches
/// wins, so a set must never contain two patterns that can both match the
/// same legitimate device output.
///
/// # Example
///
/// ```rust
/// use cucm_cop::channel::PatternSet;
///
/// let set = PatternSet::new()
///     .with_literal("Please select an option")
///     .with_literal("admin:");
///
/// let m = set.find("1) SFTP\n2) FTP\nPlease select an option (1 - 2 or \"q\" ):").unwrap();
/// assert_eq!(m.index, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: IndexMap<String, Regex>,
}

impl PatternSet {
    /// Create an empty pattern set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single literal prompt.
    pub fn literal(text: &str) -> Self {
        Self::new().with_literal(text)
    }

    /// Add a regex pattern under the given name.
    pub fn with_regex(mut self, name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns.insert(name.into(), Regex::new(pattern)?);
        Ok(self)
    }

    /// Add a literal prompt text; the text itself is used as the name.
    pub fn with_literal(mut self, text: &str) -> Self {
        let regex = Regex::new(&regex::escape(text)).expect("escaped literal is a valid regex");
        self.patterns.insert(text.to_string(), regex);
        self
    }

    /// Find the first pattern (in set order) that matches `text`.
    pub fn find(&self, text: &str) -> Option<PromptMatch> {
        self.patterns
            .iter()
            .enumerate()
            .find_map(|(index, (name, regex))| {
                regex.captures(text).map(|caps| PromptMatch {
                    index,
                    name: name.clone(),
                    captures: caps
                        .iter()
                        .skip(1)
                        .map(|group| group.map(|g| g.as_str().to_string()))
                        .collect(),
                    output: text.to_string(),
                })
            })
    }

    /// Human readable list of the patterns, used in timeout messages.
    pub fn describe(&self) -> String {
        self.patterns
            .keys()
            .map(|name| format!("'{}'", name))
            .collect::<Vec<_>>()
            .join(" or ")
    }

    /// Number of patterns in the set.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Result of a successful prompt match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMatch {
    /// Position of the matched pattern within its set.
    pub index: usize,

    /// Name of the matched pattern.
    pub name: String,

    /// Capture groups of the matched pattern (group 0 excluded).
    pub captures: Vec<Option<String>>,

    /// Cleaned output seen since the last send.
    pub output: String,
}

/// Extract the leading number of a menu line such as `" 3) file.cop.sgn"`.
///
/// Leading whitespace is skipped; returns `None` when the line does not start
/// with a digit.
pub fn leading_index(line: &str) -> Option<u32> {
    let line = line.trim_start();
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(line.len(), |(i, _)| i);
    line[..end].parse().ok()
}

/// Locate `filename` in a selection menu and return its menu index.
///
/// The entry after the `N)` prefix must equal `filename` exactly, so a
/// longer name that merely contains it is never selected.
pub fn find_file_index(menu: &str, filename: &str) -> Option<u32> {
    let filename = filename.trim();
    menu.lines().find_map(|line| {
        let (number, entry) = line.split_once(')')?;
        if entry.trim() != filename {
            return None;
        }
        leading_index(number)
    })
}
