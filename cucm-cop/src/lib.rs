//! # cucm-cop
//!
//! Installs COP files on Cisco Unified Communications Manager nodes by
//! driving the administrator CLI over an interactive SSH shell.
//!
//! The node offers no API for this, so the library plays the operator: it
//! sends a line, waits for one of a set of expected prompts, and decides
//! what to send next.
//!
//! ## Features
//!
//! - Async SSH shell sessions via russh
//! - Escape-sequence cleaning and echo suppression of device output
//! - Version (11.x/12.x) and cluster role detection
//! - Idempotent installs: an already installed file is reported, not reinstalled
//! - Optional restart after the install and per-invocation transcripts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cucm_cop::{CopUploadBuilder, UpgradeParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let params: UpgradeParams = serde_json::from_str(&std::fs::read_to_string("params.json")?)?;
//!
//!     let outcome = CopUploadBuilder::new(params).build()?.run().await;
//!     println!("changed={} {}", outcome.changed, outcome.message);
//!
//!     outcome.into_result()?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod device;
pub mod driver;
pub mod error;
pub mod transcript;
pub mod transport;

// Re-export main types for convenience
pub use channel::{ChannelSession, PatternSet, PromptMatch, ShellStream};
pub use driver::{CopUpload, CopUploadBuilder, Outcome, Timeouts, UpgradeParams, UpgradeProcedure};
pub use error::Error;
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
