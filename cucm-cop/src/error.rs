//! Error types for cucm-cop.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for cucm-cop operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Upgrade procedure errors
    #[error("Upgrade error: {0}")]
    Upgrade(#[from] UpgradeError),

    /// Invalid or missing parameters
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether this error is a prompt wait that ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Channel(ChannelError::PatternTimeout { .. })
                | Error::Transport(TransportError::Timeout(_))
                | Error::Upgrade(UpgradeError::RebootNotConfirmed { .. })
        )
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts (strict verification)
    #[error("Host key for {host}:{port} is not known")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching, shell I/O).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// None of the expected prompts appeared in time
    #[error("Timed out after {timeout:?} waiting for {waiting_for}")]
    PatternTimeout {
        waiting_for: String,
        timeout: Duration,
    },

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors raised by the upgrade drivers.
#[derive(Error, Debug)]
pub enum UpgradeError {
    /// The COP file is not listed at the remote location
    #[error("COP file not found at remote location: {file}")]
    FileNotFound { file: String },

    /// The device dropped back to the command prompt instead of continuing
    #[error("Device returned to the command prompt: {output}")]
    RemoteRejected { output: String },

    /// The restart kept asking for confirmation
    #[error("Reboot not confirmed after {reprompts} repeated confirmation prompts")]
    RebootNotConfirmed { reprompts: usize },

    /// Terminal failure reported as an outcome
    #[error("{message}")]
    Failed { changed: bool, message: String },
}

/// Parameter errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required parameter is empty
    #[error("Missing required parameter '{name}'")]
    Missing { name: &'static str },

    /// A parameter value is not acceptable
    #[error("Invalid value for '{name}': {message}")]
    Invalid { name: &'static str, message: String },
}

/// Result type alias using cucm-cop's Error.
pub type Result<T> = std::result::Result<T, Error>;
