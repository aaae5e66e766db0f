//! Restart of the node after a successful installation.

use std::time::Duration;

use log::{info, warn};

use super::params::Timeouts;
use crate::channel::{ChannelSession, PatternSet, PromptMatch, ShellStream};
use crate::device::prompts;
use crate::error::{Result, UpgradeError};

/// Default number of repeated confirmation questions accepted.
pub const DEFAULT_MAX_REPROMPTS: usize = 3;

/// State of the restart dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootState {
    /// `utils system restart` is about to be sent.
    Requested,
    /// Answering a confirmation question; counts repeated questions.
    Confirming { reprompts: usize },
    /// The node announced the reboot.
    GoingDown,
    /// The node kept asking for confirmation.
    NotConfirmed { reprompts: usize },
}

impl RebootState {
    /// Input to send when entering this state.
    pub fn input(&self) -> Option<&'static str> {
        match self {
            RebootState::Requested => Some(prompts::SYSTEM_RESTART),
            RebootState::Confirming { .. } => Some(prompts::YES),
            _ => None,
        }
    }

    /// Prompts to wait for after the input.
    pub fn expected(&self) -> Option<PatternSet> {
        match self {
            RebootState::Requested => Some(
                PatternSet::new()
                    .with_literal(prompts::YES_NO)
                    .with_literal(prompts::RESTART),
            ),
            RebootState::Confirming { .. } => Some(
                PatternSet::new()
                    .with_literal(prompts::REBOOT_NOW)
                    .with_literal(prompts::YES_NO)
                    .with_literal(prompts::RESTART),
            ),
            _ => None,
        }
    }

    pub fn timeout(&self, timeouts: &Timeouts) -> Duration {
        match self {
            RebootState::Requested => timeouts.reboot_confirm,
            _ => timeouts.reboot,
        }
    }

    /// Move on after `found` matched.
    ///
    /// A confirmation question after `yes` is answered again, at most
    /// `max_reprompts` times.
    pub fn next(self, found: &PromptMatch, max_reprompts: usize) -> RebootState {
        match self {
            RebootState::Requested => RebootState::Confirming { reprompts: 0 },
            RebootState::Confirming { .. } if found.name == prompts::REBOOT_NOW => {
                RebootState::GoingDown
            }
            RebootState::Confirming { reprompts } if reprompts < max_reprompts => {
                RebootState::Confirming {
                    reprompts: reprompts + 1,
                }
            }
            RebootState::Confirming { reprompts } => RebootState::NotConfirmed { reprompts },
            state => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RebootState::GoingDown | RebootState::NotConfirmed { .. })
    }
}

/// Restarts the node and waits for the shutdown announcement.
pub struct RebootDriver<'a> {
    timeouts: &'a Timeouts,
    max_reprompts: usize,
}

impl<'a> RebootDriver<'a> {
    pub fn new(timeouts: &'a Timeouts, max_reprompts: usize) -> Self {
        Self {
            timeouts,
            max_reprompts,
        }
    }

    /// Run the restart dialog.
    ///
    /// Fails with [`UpgradeError::RebootNotConfirmed`] when the node asks
    /// for confirmation more than `max_reprompts` times after the first
    /// `yes`.
    pub async fn run<S: ShellStream>(&self, session: &mut ChannelSession<S>) -> Result<()> {
        info!("Restarting node");
        let mut state = RebootState::Requested;

        while !state.is_terminal() {
            if let Some(input) = state.input() {
                session.send(input).await?;
            }
            let Some(set) = state.expected() else {
                break;
            };
            let found = session
                .await_pattern(&set, state.timeout(self.timeouts))
                .await?;

            state = state.next(&found, self.max_reprompts);
            if let RebootState::Confirming { reprompts } = state {
                if reprompts > 0 {
                    warn!("Restart asked for confirmation again ({})", reprompts);
                }
            }
        }

        match state {
            RebootState::NotConfirmed { reprompts } => {
                Err(UpgradeError::RebootNotConfirmed { reprompts }.into())
            }
            _ => {
                info!("Node is going down for reboot");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::channel::testing::{Reply, ScriptedShell};
    use crate::error::Error;

    const CONFIRM: &str = "Do you really want to restart ?\nEnter (yes/no)?";
    const GOING_DOWN: &str = "Appliance is being Restarted ...\nBroadcast message from root\nThe system is going down for reboot NOW!";

    fn matched(name: &str) -> PromptMatch {
        PromptMatch {
            index: 0,
            name: name.to_string(),
            captures: Vec::new(),
            output: String::new(),
        }
    }

    #[test]
    fn test_transitions() {
        let state = RebootState::Requested.next(&matched(prompts::YES_NO), 3);
        assert_eq!(state, RebootState::Confirming { reprompts: 0 });
        assert_eq!(state.input(), Some("yes"));

        let again = state.next(&matched(prompts::RESTART), 3);
        assert_eq!(again, RebootState::Confirming { reprompts: 1 });

        assert_eq!(again.next(&matched(prompts::REBOOT_NOW), 3), RebootState::GoingDown);
        assert_eq!(
            again.next(&matched(prompts::YES_NO), 1),
            RebootState::NotConfirmed { reprompts: 1 }
        );
    }

    #[tokio::test]
    async fn test_single_confirmation() {
        let shell = ScriptedShell::new()
            .echoing()
            .on("utils system restart", Reply::text(CONFIRM))
            .on("yes", Reply::text(GOING_DOWN));
        let sent = shell.sent();
        let mut session = ChannelSession::new(shell);
        let timeouts = Timeouts::uniform(Duration::from_secs(1));

        assert_ok!(
            RebootDriver::new(&timeouts, DEFAULT_MAX_REPROMPTS)
                .run(&mut session)
                .await
        );
        assert_eq!(sent.lines(), vec!["utils system restart", "yes"]);
    }

    #[tokio::test]
    async fn test_late_prompt_before_echo() {
        let shell = ScriptedShell::new()
            .on(
                "utils system restart",
                Reply::chunks([
                    "admin:utils system restart\r\n",
                    "Do you really want to restart ?\r\nEnter (yes/no)?",
                ]),
            )
            .on("yes", Reply::text(GOING_DOWN));
        let sent = shell.sent();
        let mut session = ChannelSession::new(shell);
        let timeouts = Timeouts::uniform(Duration::from_secs(1));

        assert_ok!(
            RebootDriver::new(&timeouts, DEFAULT_MAX_REPROMPTS)
                .run(&mut session)
                .await
        );
        assert_eq!(sent.lines(), vec!["utils system restart", "yes"]);
    }

    #[tokio::test]
    async fn test_repeated_confirmation() {
        let shell = ScriptedShell::new()
            .echoing()
            .on("utils system restart", Reply::text(CONFIRM))
            .on("yes", Reply::text("Enter (yes/no)?"))
            .on("yes", Reply::text(GOING_DOWN));
        let sent = shell.sent();
        let mut session = ChannelSession::new(shell);
        let timeouts = Timeouts::uniform(Duration::from_secs(1));

        assert_ok!(
            RebootDriver::new(&timeouts, DEFAULT_MAX_REPROMPTS)
                .run(&mut session)
                .await
        );
        assert_eq!(sent.count("yes"), 2);
    }

    #[tokio::test]
    async fn test_reprompt_cap_exceeded() {
        let shell = ScriptedShell::new()
            .on("utils system restart", Reply::text(CONFIRM))
            .on("yes", Reply::text("Enter (yes/no)?"))
            .on("yes", Reply::text("Enter (yes/no)?"))
            .on("yes", Reply::text("Enter (yes/no)?"));
        let sent = shell.sent();
        let mut session = ChannelSession::new(shell);
        let timeouts = Timeouts::uniform(Duration::from_secs(1));

        let err = RebootDriver::new(&timeouts, 2)
            .run(&mut session)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(
            err,
            Error::Upgrade(UpgradeError::RebootNotConfirmed { reprompts: 2 })
        ));
        assert_eq!(sent.count("yes"), 3);
    }

    #[tokio::test]
    async fn test_no_confirmation_question() {
        let shell = ScriptedShell::new().on("utils system restart", Reply::text("Command not found\nadmin:"));
        let mut session = ChannelSession::new(shell);
        let timeouts = Timeouts::uniform(Duration::from_millis(50));

        let err = assert_err!(
            RebootDriver::new(&timeouts, DEFAULT_MAX_REPROMPTS)
                .run(&mut session)
                .await
        );
        assert!(err.is_timeout());
    }
}
