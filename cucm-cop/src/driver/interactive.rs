//! Linear prompt dialogs: send an input, wait for the next prompt.
//!
//! Fixed stretches of the upgrade dialog (the transfer settings, the
//! cancel/initiate commands) are written as a list of steps and run in
//! order. Branching parts of the workflow use explicit state machines
//! instead.

use std::time::Duration;

use log::debug;

use crate::channel::{ChannelSession, PatternSet, PromptMatch, ShellStream};
use crate::error::Result;

/// One step of a dialog.
///
/// The input is sent first; then, unless `expect` is `None`, the step waits
/// up to `timeout` for one of the expected prompts.
#[derive(Debug, Clone)]
pub struct DialogStep {
    /// The input to send.
    pub input: String,

    /// Whether the input must be kept out of logs (passwords).
    pub hidden: bool,

    /// Prompts to wait for after sending.
    pub expect: Option<PatternSet>,

    /// Wait limit for this step.
    pub timeout: Duration,
}

impl DialogStep {
    /// Text safe to show in logs.
    pub fn display_input(&self) -> &str {
        if self.hidden { "********" } else { &self.input }
    }
}

/// Builder for dialog step lists.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use cucm_cop::driver::DialogBuilder;
///
/// let steps = DialogBuilder::new(Duration::from_secs(5))
///     .send("1")
///     .expect("Directory")
///     .send("/cop_files")
///     .expect("Server")
///     .send("10.10.10.5")
///     .no_wait()
///     .build();
/// assert_eq!(steps.len(), 3);
/// ```
#[derive(Debug)]
pub struct DialogBuilder {
    steps: Vec<DialogStep>,
    timeout: Duration,
}

impl DialogBuilder {
    /// Create a builder; `timeout` is the default for every step.
    pub fn new(timeout: Duration) -> Self {
        Self {
            steps: Vec::new(),
            timeout,
        }
    }

    /// Add an input to send.
    pub fn send(self, input: impl Into<String>) -> DialogBuilderWithInput {
        DialogBuilderWithInput {
            timeout: self.timeout,
            builder: self,
            input: input.into(),
            hidden: false,
        }
    }

    /// Add an input that is never logged.
    pub fn send_hidden(self, input: impl Into<String>) -> DialogBuilderWithInput {
        DialogBuilderWithInput {
            timeout: self.timeout,
            builder: self,
            input: input.into(),
            hidden: true,
        }
    }

    /// Build the list of steps.
    pub fn build(self) -> Vec<DialogStep> {
        self.steps
    }
}

/// Intermediate state for the builder after `send()` is called.
#[derive(Debug)]
pub struct DialogBuilderWithInput {
    builder: DialogBuilder,
    input: String,
    hidden: bool,
    timeout: Duration,
}

impl DialogBuilderWithInput {
    /// Wait for a literal prompt after sending.
    pub fn expect(self, prompt: &str) -> DialogBuilder {
        self.expect_any(PatternSet::literal(prompt))
    }

    /// Wait for any prompt of `set` after sending.
    pub fn expect_any(self, set: PatternSet) -> DialogBuilder {
        self.push(Some(set))
    }

    /// Send without waiting; the caller handles what comes next.
    pub fn no_wait(self) -> DialogBuilder {
        self.push(None)
    }

    /// Set a custom timeout for this step.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn push(mut self, expect: Option<PatternSet>) -> DialogBuilder {
        self.builder.steps.push(DialogStep {
            input: self.input,
            hidden: self.hidden,
            expect,
            timeout: self.timeout,
        });
        self.builder
    }
}

/// Run the steps in order, stopping at the first failed wait.
///
/// Returns the prompt matched by every step that waited.
pub async fn run_dialog<S: ShellStream>(
    session: &mut ChannelSession<S>,
    steps: &[DialogStep],
) -> Result<Vec<PromptMatch>> {
    let mut matches = Vec::with_capacity(steps.len());

    for step in steps {
        if step.hidden {
            session.send_hidden(&step.input).await?;
        } else {
            session.send(&step.input).await?;
        }

        if let Some(expect) = &step.expect {
            let found = session.await_pattern(expect, step.timeout).await?;
            debug!("dialog: {:?} -> '{}'", step.display_input(), found.name);
            matches.push(found);
        }
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::testing::{Reply, ScriptedShell};

    #[test]
    fn test_builder_steps() {
        let steps = DialogBuilder::new(Duration::from_secs(5))
            .send("enable")
            .expect("Password")
            .send_hidden("secret")
            .expect("admin:")
            .send("yes")
            .with_timeout(Duration::from_secs(60))
            .no_wait()
            .build();

        assert_eq!(steps.len(), 3);
        assert!(!steps[0].hidden);
        assert!(steps[1].hidden);
        assert_eq!(steps[1].display_input(), "********");
        assert_eq!(steps[0].timeout, Duration::from_secs(5));
        assert_eq!(steps[2].timeout, Duration::from_secs(60));
        assert!(steps[2].expect.is_none());
    }

    #[tokio::test]
    async fn test_run_dialog_in_order() {
        let shell = ScriptedShell::new()
            .on("1", Reply::text("Directory:"))
            .on("/cop", Reply::text("Server:"));
        let sent = shell.sent();
        let mut session = ChannelSession::new(shell);

        let steps = DialogBuilder::new(Duration::from_secs(1))
            .send("1")
            .expect("Directory")
            .send("/cop")
            .expect("Server")
            .build();
        let matches = run_dialog(&mut session, &steps).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].name, "Server");
        assert_eq!(sent.lines(), vec!["1", "/cop"]);
    }

    #[tokio::test]
    async fn test_run_dialog_stops_on_timeout() {
        let shell = ScriptedShell::new().on("1", Reply::Silent);
        let sent = shell.sent();
        let mut session = ChannelSession::new(shell);

        let steps = DialogBuilder::new(Duration::from_millis(50))
            .send("1")
            .expect("Directory")
            .send("/cop")
            .expect("Server")
            .build();
        let err = run_dialog(&mut session, &steps).await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(sent.lines(), vec!["1"]);
    }
}
