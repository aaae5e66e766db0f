//! File selection and installation.
//!
//! After the transfer settings are answered the node lists the files found
//! at the remote location. The driver picks the COP file from that listing,
//! confirms the installation and waits for the success marker:
//!
//! ```text
//! AwaitingMenuOrPrompt --menu, file listed--> FileSelection --start--> ConfirmInstall
//!         |                                        |                        |
//!         +--menu, file missing--> Failure         +--admin:--> Failure     v
//!         +--admin:--> Failure                              InstallRunning --installed--> Success
//! ```

use std::time::Duration;

use log::{error, info};

use super::outcome::Outcome;
use super::params::Timeouts;
use crate::channel::{find_file_index, ChannelSession, PatternSet, PromptMatch, ShellStream};
use crate::device::prompts;
use crate::error::{Result, UpgradeError};

/// Why an installation stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallFailure {
    /// The listing did not contain the file.
    FileNotFound,
    /// The node went back to the command prompt.
    RemoteRejected { output: String },
}

impl InstallFailure {
    fn into_error(self, filename: &str) -> UpgradeError {
        match self {
            InstallFailure::FileNotFound => UpgradeError::FileNotFound {
                file: filename.to_string(),
            },
            InstallFailure::RemoteRejected { output } => UpgradeError::RemoteRejected { output },
        }
    }
}

/// State of the installation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    /// Waiting for the file listing (or an error back at the prompt).
    AwaitingMenuOrPrompt,
    /// The file was found under this menu index.
    FileSelection { index: u32 },
    /// The node asked whether to start the installation.
    ConfirmInstall,
    /// Installation confirmed, waiting for the result.
    InstallRunning,
    Success,
    Failure(InstallFailure),
}

impl InstallState {
    /// Input to send when entering this state.
    pub fn input(&self) -> Option<String> {
        match self {
            InstallState::FileSelection { index } => Some(index.to_string()),
            InstallState::ConfirmInstall => Some(prompts::YES.to_string()),
            _ => None,
        }
    }

    /// Prompts to wait for in this state; `None` moves on without waiting.
    pub fn expected(&self) -> Option<PatternSet> {
        match self {
            InstallState::AwaitingMenuOrPrompt => Some(
                PatternSet::new()
                    .with_literal(prompts::OPTION_MENU)
                    .with_literal(prompts::COMMAND_PROMPT),
            ),
            InstallState::FileSelection { .. } => Some(
                PatternSet::new()
                    .with_literal(prompts::START_INSTALLATION)
                    .with_literal(prompts::COMMAND_PROMPT),
            ),
            InstallState::InstallRunning => Some(
                PatternSet::new()
                    .with_literal(prompts::SUCCESSFULLY_INSTALLED)
                    .with_literal(prompts::COMMAND_PROMPT),
            ),
            _ => None,
        }
    }

    /// Wait limit of this state.
    pub fn timeout(&self, timeouts: &Timeouts) -> Duration {
        match self {
            InstallState::AwaitingMenuOrPrompt => timeouts.transfer,
            InstallState::FileSelection { .. } => timeouts.install_confirm,
            _ => timeouts.install,
        }
    }

    /// Move to the next state given the prompt that matched.
    pub fn next(self, found: Option<&PromptMatch>, filename: &str) -> InstallState {
        let name = found.map(|m| m.name.as_str());
        match (self, name) {
            (state, _) if state.is_terminal() => state,
            (_, Some(prompts::COMMAND_PROMPT)) => InstallState::Failure(InstallFailure::RemoteRejected {
                output: found.map(|m| m.output.clone()).unwrap_or_default(),
            }),
            (InstallState::AwaitingMenuOrPrompt, Some(prompts::OPTION_MENU)) => {
                let listing = found.map(|m| m.output.as_str()).unwrap_or_default();
                match find_file_index(listing, filename) {
                    Some(index) => InstallState::FileSelection { index },
                    None => InstallState::Failure(InstallFailure::FileNotFound),
                }
            }
            (InstallState::FileSelection { .. }, Some(prompts::START_INSTALLATION)) => {
                InstallState::ConfirmInstall
            }
            (InstallState::ConfirmInstall, None) => InstallState::InstallRunning,
            (InstallState::InstallRunning, Some(prompts::SUCCESSFULLY_INSTALLED)) => {
                InstallState::Success
            }
            (_, _) => InstallState::Failure(InstallFailure::RemoteRejected {
                output: found.map(|m| m.output.clone()).unwrap_or_default(),
            }),
        }
    }

    /// Check if the dialog is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallState::Success | InstallState::Failure(_))
    }
}

/// Drives the installation dialog for one file.
pub struct InstallDriver<'a> {
    filename: &'a str,
    timeouts: &'a Timeouts,
}

impl<'a> InstallDriver<'a> {
    pub fn new(filename: &'a str, timeouts: &'a Timeouts) -> Self {
        Self { filename, timeouts }
    }

    /// Run the dialog to completion and report the result.
    ///
    /// Errors never escape: timeouts and rejections become failed outcomes
    /// with `changed == false`.
    pub async fn run<S: ShellStream>(&self, session: &mut ChannelSession<S>) -> Outcome {
        match self.install(session).await {
            Ok(()) => {
                info!("COP {} installed", self.filename);
                Outcome::succeeded(true, format!("COP {} successfully installed", self.filename))
            }
            Err(e) => {
                error!("Installation of {} failed: {}", self.filename, e);
                Outcome::failed(false, e.to_string())
            }
        }
    }

    /// Walk the states until a terminal one is reached.
    pub async fn install<S: ShellStream>(&self, session: &mut ChannelSession<S>) -> Result<()> {
        let mut state = InstallState::AwaitingMenuOrPrompt;

        while !state.is_terminal() {
            if let Some(input) = state.input() {
                session.send(&input).await?;
            }

            let found = match state.expected() {
                Some(set) => Some(
                    session
                        .await_pattern(&set, state.timeout(self.timeouts))
                        .await?,
                ),
                None => None,
            };

            state = state.next(found.as_ref(), self.filename);
            if let InstallState::FileSelection { index } = &state {
                info!("Selecting {} (option {})", self.filename, index);
            }
        }

        match state {
            InstallState::Failure(failure) => Err(failure.into_error(self.filename).into()),
            _ => Ok(()),
        }
    }
}
