//! The complete COP upgrade procedure over one shell session.

use log::{error, info, warn};

use super::install::InstallDriver;
use super::outcome::Outcome;
use super::params::Timeouts;
use super::reboot::{RebootDriver, DEFAULT_MAX_REPROMPTS};
use super::transfer::TransferConfigurator;
use crate::channel::{ChannelSession, PatternSet, ShellStream};
use crate::device::inspector::{classify_version, is_installed};
use crate::device::prompts;
use crate::device::{DeviceInspector, NodeRole, SessionContext, Version};
use crate::error::{Result, UpgradeError};

/// Sequences inspection, transfer, installation and the optional restart.
#[derive(Debug)]
pub struct UpgradeProcedure {
    context: SessionContext,
    timeouts: Timeouts,
    max_reboot_reprompts: usize,
}

impl UpgradeProcedure {
    pub fn new(context: SessionContext, timeouts: Timeouts) -> Self {
        Self {
            context,
            timeouts,
            max_reboot_reprompts: DEFAULT_MAX_REPROMPTS,
        }
    }

    /// Set how many repeated restart confirmations are answered.
    pub fn with_max_reboot_reprompts(mut self, max: usize) -> Self {
        self.max_reboot_reprompts = max;
        self
    }

    /// The session context, including what was detected so far.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Run the procedure. Every error ends up in a failed outcome.
    pub async fn execute<S: ShellStream>(&mut self, session: &mut ChannelSession<S>) -> Outcome {
        let outcome = match self.upgrade(session).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::failed(false, e.to_string()),
        };

        if outcome.succeeded {
            info!("{}: {}", self.context.target_address, outcome.message);
        } else {
            error!("{}: {}", self.context.target_address, outcome.message);
        }
        outcome
    }

    async fn upgrade<S: ShellStream>(&mut self, session: &mut ChannelSession<S>) -> Result<Outcome> {
        let command_prompt = prompts::command_prompt();
        session
            .await_pattern(&command_prompt, self.timeouts.command)
            .await?;

        if self.inspect(session).await? {
            return Ok(Outcome::succeeded(
                false,
                format!("COP {} already installed", self.context.filename),
            ));
        }

        session
            .command(prompts::UPGRADE_CANCEL, &command_prompt, self.timeouts.command)
            .await?;
        session.send(prompts::UPGRADE_INITIATE).await?;

        if self.context.is_v12_secondary() {
            session
                .await_pattern(
                    &PatternSet::literal(prompts::DOWNLOAD_CREDENTIALS),
                    self.timeouts.credentials,
                )
                .await?;
            session.send(prompts::NO).await?;
        }

        self.reach_source_menu(session).await?;

        TransferConfigurator::new(&self.context, self.timeouts.menu)
            .run(session)
            .await?;

        let outcome = InstallDriver::new(&self.context.filename, &self.timeouts)
            .run(session)
            .await;
        if !outcome.succeeded || !self.context.reboot {
            return Ok(outcome);
        }

        let reboot = RebootDriver::new(&self.timeouts, self.max_reboot_reprompts)
            .run(session)
            .await;
        Ok(match reboot {
            Ok(()) => Outcome::succeeded(
                true,
                format!("CUCM rebooted. COP {} successfully installed", self.context.filename),
            ),
            Err(e) => Outcome::failed(
                true,
                format!(
                    "COP {} successfully installed, reboot failed: {}",
                    self.context.filename, e
                ),
            ),
        })
    }

    /// Fill in version, node name and role. Returns whether the file is
    /// already installed, in which case nothing else is detected.
    async fn inspect<S: ShellStream>(&mut self, session: &mut ChannelSession<S>) -> Result<bool> {
        let mut inspector = DeviceInspector::new(session, self.timeouts.command);

        let report = inspector.active_version_report().await?;
        if is_installed(&report, self.context.installed_name()) {
            return Ok(true);
        }

        self.context.version = classify_version(&report);
        if self.context.version == Version::Unknown {
            warn!("Unrecognized version report from {}", self.context.target_address);
        } else {
            info!(
                "{} runs version {}",
                self.context.target_address, self.context.version
            );
        }

        if self.context.version == Version::V12 {
            let (name, role) = inspector.detect_role(&self.context.target_address).await?;
            self.context.node_name = name;
            self.context.role = role;
        }
        Ok(false)
    }

    /// Wait for the source option menu, taking over a running upgrade
    /// session when the node offers it.
    async fn reach_source_menu<S: ShellStream>(&self, session: &mut ChannelSession<S>) -> Result<()> {
        // the credentials question can only be told apart by the role
        let mut ask_credentials =
            self.context.version != Version::V11 && self.context.role == NodeRole::Unknown;

        loop {
            let found = session
                .await_pattern(&main_menu_patterns(ask_credentials), self.timeouts.main_menu)
                .await?;

            match found.name.as_str() {
                prompts::OPTION_MENU => return Ok(()),
                prompts::ASSUME_CONTROL => {
                    info!("Assuming control of the running upgrade session");
                    session.send(prompts::YES).await?;
                    session
                        .await_pattern(&PatternSet::literal(prompts::OPTION_MENU), self.timeouts.menu)
                        .await?;
                    return Ok(());
                }
                prompts::DOWNLOAD_CREDENTIALS => {
                    session.send(prompts::NO).await?;
                    ask_credentials = false;
                }
                _ => return Err(UpgradeError::RemoteRejected { output: found.output }.into()),
            }
        }
    }
}

fn main_menu_patterns(ask_credentials: bool) -> PatternSet {
    let set = PatternSet::new()
        .with_literal(prompts::OPTION_MENU)
        .with_literal(prompts::ASSUME_CONTROL);
    let set = if ask_credentials {
        set.with_literal(prompts::DOWNLOAD_CREDENTIALS)
    } else {
        set
    };
    set.with_literal(prompts::COMMAND_PROMPT)
}
