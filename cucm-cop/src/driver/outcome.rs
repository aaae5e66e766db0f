//! Result record of one upload job.

use serde::Serialize;

use crate::error::{Result, UpgradeError};

/// What happened on the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Whether the job reached its goal.
    pub succeeded: bool,

    /// Whether the node state changed, confirmed by the device's own
    /// success text.
    pub changed: bool,

    /// Human readable result; explains the failure when `succeeded` is false.
    pub message: String,
}

impl Outcome {
    /// Create a successful outcome.
    pub fn succeeded(changed: bool, message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            changed,
            message: message.into(),
        }
    }

    /// Create a failed outcome.
    pub fn failed(changed: bool, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            changed,
            message: message.into(),
        }
    }

    /// Check if the outcome indicates success.
    pub fn is_success(&self) -> bool {
        self.succeeded
    }

    /// Turn a failed outcome into an error.
    pub fn into_result(self) -> Result<Outcome> {
        if self.succeeded {
            Ok(self)
        } else {
            Err(UpgradeError::Failed {
                changed: self.changed,
                message: self.message,
            }
            .into())
        }
    }
}
