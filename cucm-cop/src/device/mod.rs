//! CallManager device knowledge.
//!
//! This module holds the CLI prompt catalogue, the per-session context and
//! the inspector that classifies the node before an upgrade.

mod context;
pub mod inspector;
pub mod prompts;

pub use context::{NodeRole, SessionContext, Version};
pub use inspector::DeviceInspector;
