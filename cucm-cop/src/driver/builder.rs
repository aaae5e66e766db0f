//! Builder for COP upload jobs.

use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};
use secrecy::ExposeSecret;

use super::outcome::Outcome;
use super::params::{Timeouts, UpgradeParams};
use super::procedure::UpgradeProcedure;
use super::reboot::DEFAULT_MAX_REPROMPTS;
use crate::channel::ChannelSession;
use crate::device::SessionContext;
use crate::error::Result;
use crate::transcript::FileTranscript;
use crate::transport::{AuthMethod, HostKeyVerification, SshConfig, SshShell, SshTransport};

/// Builder for one COP upload against one node.
///
/// # Example
///
/// ```rust,no_run
/// use cucm_cop::driver::{CopUploadBuilder, UpgradeParams};
///
/// # async fn example(params: UpgradeParams) -> Result<(), cucm_cop::Error> {
/// let outcome = CopUploadBuilder::new(params)
///     .transcript_dir("/var/log/cop")
///     .build()?
///     .run()
///     .await;
/// println!("{}", outcome.message);
/// # Ok(())
/// # }
/// ```
pub struct CopUploadBuilder {
    params: UpgradeParams,
    port: u16,
    ssh_timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    private_key: Option<(PathBuf, Option<String>)>,
    timeouts: Timeouts,
    max_reboot_reprompts: usize,
    transcript_dir: PathBuf,
}

impl CopUploadBuilder {
    /// Create a builder from the job parameters.
    pub fn new(params: UpgradeParams) -> Self {
        Self {
            params,
            port: 22,
            ssh_timeout: Duration::from_secs(25),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            private_key: None,
            timeouts: Timeouts::default(),
            max_reboot_reprompts: DEFAULT_MAX_REPROMPTS,
            transcript_dir: PathBuf::from("."),
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the SSH connect timeout.
    pub fn ssh_timeout(mut self, timeout: Duration) -> Self {
        self.ssh_timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a custom known_hosts file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Authenticate with a private key instead of the SSH password.
    pub fn private_key(mut self, path: impl Into<PathBuf>, passphrase: Option<String>) -> Self {
        self.private_key = Some((path.into(), passphrase));
        self
    }

    /// Set the per-step timeouts.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set how many repeated restart confirmations are answered.
    pub fn max_reboot_reprompts(mut self, max: usize) -> Self {
        self.max_reboot_reprompts = max;
        self
    }

    /// Directory for transcript files (default: working directory).
    pub fn transcript_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transcript_dir = dir.into();
        self
    }

    /// Validate the parameters and build the job.
    ///
    /// This does not connect; call [`CopUpload::run`].
    pub fn build(self) -> Result<CopUpload> {
        let mut params = self.params;
        params.normalize();
        params.validate()?;

        let auth = match self.private_key {
            Some((path, passphrase)) => AuthMethod::PrivateKey { path, passphrase },
            None => AuthMethod::Password(params.ssh_password.expose_secret().to_string()),
        };

        let mut ssh_config = SshConfig::new(params.cucm_ip.clone(), params.ssh_username.clone(), auth);
        ssh_config.port = self.port;
        ssh_config.timeout = self.ssh_timeout;
        ssh_config.host_key_verification = self.host_key_verification;
        ssh_config.known_hosts_path = self.known_hosts_path;

        let transfer = params.transfer_settings();
        let context = SessionContext::new(params.cucm_ip, params.remote_file, transfer)
            .with_reboot(params.do_reboot)
            .with_logging(params.do_logging);
        let procedure = UpgradeProcedure::new(context, self.timeouts)
            .with_max_reboot_reprompts(self.max_reboot_reprompts);

        Ok(CopUpload {
            ssh_config,
            procedure,
            transcript_dir: self.transcript_dir,
        })
    }
}

/// A validated upload job, ready to run once.
#[derive(Debug)]
pub struct CopUpload {
    ssh_config: SshConfig,
    procedure: UpgradeProcedure,
    transcript_dir: PathBuf,
}

impl CopUpload {
    /// SSH settings the job connects with.
    pub fn ssh_config(&self) -> &SshConfig {
        &self.ssh_config
    }

    /// The procedure the job runs.
    pub fn procedure(&self) -> &UpgradeProcedure {
        &self.procedure
    }

    /// Connect, run the procedure and close the session.
    ///
    /// Never fails: connection errors and procedure errors are reported
    /// in the outcome.
    pub async fn run(mut self) -> Outcome {
        let address = self.ssh_config.host.clone();
        info!(
            "Uploading COP {} to {}",
            self.procedure.context().filename,
            address
        );

        let shell = match self.open().await {
            Ok(shell) => shell,
            Err(e) => {
                error!("{}: {}", address, e);
                return Outcome::failed(false, e.to_string());
            }
        };

        let mut session = ChannelSession::new(shell);
        if self.procedure.context().logging {
            match FileTranscript::create(&self.transcript_dir, &address) {
                Ok(transcript) => {
                    info!("Writing transcript to {}", transcript.path().display());
                    session = session.with_transcript(Box::new(transcript));
                }
                Err(e) => warn!("Cannot create transcript for {}: {}", address, e),
            }
        }

        let outcome = self.procedure.execute(&mut session).await;

        if let Err(e) = session.close().await {
            warn!("Closing session to {} failed: {}", address, e);
        }
        outcome
    }

    async fn open(&self) -> Result<SshShell> {
        SshTransport::connect(self.ssh_config.clone())
            .await?
            .open_shell()
            .await
    }
}
