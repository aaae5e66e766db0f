//! Upgrade parameters, transfer settings and per-step timeouts.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ConfigError;

/// Extension every signed COP file carries.
pub const SIGNED_EXTENSION: &str = ".sgn";

/// Inventory prefixes some orchestrators leave on connection values.
const HOST_PREFIX: &str = "ansible_ssh_host=";
const USER_PREFIX: &str = "ansible_user=";
const PASS_PREFIX: &str = "ansible_ssh_pass=";

/// Protocol the node uses to fetch the COP file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TransferProtocol {
    #[serde(rename = "FTP", alias = "ftp")]
    Ftp,
    #[serde(rename = "SFTP", alias = "sftp")]
    Sftp,
}

impl TransferProtocol {
    /// Entry of the source selection menu for this protocol.
    pub fn menu_choice(&self) -> &'static str {
        match self {
            TransferProtocol::Sftp => "1",
            TransferProtocol::Ftp => "2",
        }
    }
}

/// Remote location of the COP file.
#[derive(Debug)]
pub struct TransferSettings {
    pub protocol: TransferProtocol,
    pub directory: String,
    pub server: String,
    pub username: String,
    pub password: SecretString,
    /// Mail notification host; answered with an empty line when unset.
    pub smtp_host: Option<String>,
}

impl TransferSettings {
    /// Create settings without a mail notification host.
    pub fn new(
        protocol: TransferProtocol,
        directory: impl Into<String>,
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            directory: directory.into(),
            server: server.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            smtp_host: None,
        }
    }

    /// Set the mail notification host.
    pub fn with_smtp_host(mut self, host: impl Into<String>) -> Self {
        self.smtp_host = Some(host.into());
        self
    }
}

/// Parameters of one COP upload, as supplied by the calling orchestrator.
///
/// Field aliases accept the upper-case parameter names used by playbooks.
#[derive(Debug, Deserialize)]
pub struct UpgradeParams {
    #[serde(alias = "CUCM_IP")]
    pub cucm_ip: String,
    #[serde(alias = "CUCM_SSH_USERNAME")]
    pub ssh_username: String,
    #[serde(alias = "CUCM_SSH_PASSWORD")]
    pub ssh_password: SecretString,
    #[serde(alias = "REMOTE_SERVER")]
    pub remote_server: String,
    #[serde(alias = "REMOTE_USERNAME")]
    pub remote_username: String,
    #[serde(alias = "REMOTE_PASSWORD")]
    pub remote_password: SecretString,
    #[serde(alias = "REMOTE_DIRECTORY")]
    pub remote_directory: String,
    #[serde(alias = "REMOTE_SMTP", default)]
    pub remote_smtp: Option<String>,
    #[serde(alias = "REMOTE_FILE")]
    pub remote_file: String,
    #[serde(alias = "REMOTE_SERVER_TYPE")]
    pub remote_server_type: TransferProtocol,
    #[serde(alias = "DO_REBOOT", default)]
    pub do_reboot: bool,
    #[serde(alias = "DO_LOGGING", default)]
    pub do_logging: bool,
}

impl UpgradeParams {
    /// Strip inventory prefixes from the connection values and blank
    /// optional values.
    pub fn normalize(&mut self) {
        if let Some(rest) = self.cucm_ip.strip_prefix(HOST_PREFIX) {
            self.cucm_ip = rest.to_string();
        }
        if let Some(rest) = self.ssh_username.strip_prefix(USER_PREFIX) {
            self.ssh_username = rest.to_string();
        }
        let stripped = self
            .ssh_password
            .expose_secret()
            .strip_prefix(PASS_PREFIX)
            .map(str::to_string);
        if let Some(rest) = stripped {
            self.ssh_password = SecretString::from(rest);
        }
        self.cucm_ip = self.cucm_ip.trim().to_string();
        if self.remote_smtp.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.remote_smtp = None;
        }
    }

    /// Check that every required value is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("CUCM_IP", self.cucm_ip.as_str()),
            ("CUCM_SSH_USERNAME", self.ssh_username.as_str()),
            ("CUCM_SSH_PASSWORD", self.ssh_password.expose_secret()),
            ("REMOTE_SERVER", self.remote_server.as_str()),
            ("REMOTE_USERNAME", self.remote_username.as_str()),
            ("REMOTE_PASSWORD", self.remote_password.expose_secret()),
            ("REMOTE_DIRECTORY", self.remote_directory.as_str()),
            ("REMOTE_FILE", self.remote_file.as_str()),
        ];
        if let Some(&(name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::Missing { name });
        }

        if !self.remote_file.ends_with(SIGNED_EXTENSION)
            || self.remote_file.len() == SIGNED_EXTENSION.len()
        {
            return Err(ConfigError::Invalid {
                name: "REMOTE_FILE",
                message: format!(
                    "'{}' must include the signed file extension ({})",
                    self.remote_file, SIGNED_EXTENSION
                ),
            });
        }

        Ok(())
    }

    /// Split off the transfer settings.
    pub(crate) fn transfer_settings(&mut self) -> TransferSettings {
        TransferSettings {
            protocol: self.remote_server_type,
            directory: std::mem::take(&mut self.remote_directory),
            server: std::mem::take(&mut self.remote_server),
            username: std::mem::take(&mut self.remote_username),
            password: std::mem::replace(&mut self.remote_password, SecretString::from(String::new())),
            smtp_host: self.remote_smtp.take(),
        }
    }
}

/// Per-step timeouts of the upgrade procedure.
///
/// Menu prompts answer within seconds; transfer, install and reboot steps
/// wait on real device work and get minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Plain CLI commands up to the next `admin:` prompt.
    pub command: Duration,
    /// Local prompts of the upgrade dialog.
    pub menu: Duration,
    /// The v12 secondary-node credentials question.
    pub credentials: Duration,
    /// First option menu after initiating the upgrade.
    pub main_menu: Duration,
    /// Remote directory listing (network transfer).
    pub transfer: Duration,
    /// Download of the selected file up to the install confirmation.
    pub install_confirm: Duration,
    /// Installation up to the success marker.
    pub install: Duration,
    /// Restart confirmation question.
    pub reboot_confirm: Duration,
    /// Restart up to the shutdown marker.
    pub reboot: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command: Duration::from_secs(60),
            menu: Duration::from_secs(5),
            credentials: Duration::from_secs(10),
            main_menu: Duration::from_secs(50),
            transfer: Duration::from_secs(1800),
            install_confirm: Duration::from_secs(1800),
            install: Duration::from_secs(600),
            reboot_confirm: Duration::from_secs(10),
            reboot: Duration::from_secs(300),
        }
    }
}

impl Timeouts {
    /// All steps share one timeout. Mostly useful in tests.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            command: timeout,
            menu: timeout,
            credentials: timeout,
            main_menu: timeout,
            transfer: timeout,
            install_confirm: timeout,
            install: timeout,
            reboot_confirm: timeout,
            reboot: timeout,
        }
    }
}
