//! Transfer settings dialog of `utils system upgrade initiate`.

use std::time::Duration;

use log::info;
use secrecy::ExposeSecret;

use super::interactive::{run_dialog, DialogBuilder, DialogStep};
use crate::channel::{ChannelSession, ShellStream};
use crate::device::prompts;
use crate::device::{SessionContext, Version};
use crate::error::Result;

/// Answers the source menu and the remote location questions.
///
/// Starts with the source option menu on screen. The last answer is sent
/// without waiting; the file listing that follows belongs to the install
/// driver.
pub struct TransferConfigurator<'a> {
    context: &'a SessionContext,
    timeout: Duration,
}

impl<'a> TransferConfigurator<'a> {
    /// Create a configurator; `timeout` applies to every prompt.
    pub fn new(context: &'a SessionContext, timeout: Duration) -> Self {
        Self { context, timeout }
    }

    /// The dialog for the detected version.
    pub fn steps(&self) -> Vec<DialogStep> {
        let transfer = &self.context.transfer;
        let smtp = transfer.smtp_host.clone().unwrap_or_default();

        let builder = DialogBuilder::new(self.timeout)
            .send(transfer.protocol.menu_choice())
            .expect(prompts::DIRECTORY)
            .send(transfer.directory.as_str())
            .expect(prompts::SERVER)
            .send(transfer.server.as_str())
            .expect(prompts::USER_NAME)
            .send(transfer.username.as_str())
            .expect(prompts::PASSWORD)
            .send_hidden(transfer.password.expose_secret())
            .expect(prompts::SMTP_HOST);

        match self.context.version {
            Version::V12 => builder
                .send(smtp)
                .expect(prompts::CONTINUE_AFTER_DOWNLOAD)
                .send(prompts::NO)
                .expect(prompts::SWITCH_VERSION)
                .send(prompts::NO)
                .no_wait()
                .build(),
            _ => builder.send(smtp).no_wait().build(),
        }
    }

    /// Run the dialog.
    pub async fn run<S: ShellStream>(&self, session: &mut ChannelSession<S>) -> Result<()> {
        info!(
            "Configuring transfer from {}:{}",
            self.context.transfer.server, self.context.transfer.directory
        );
        run_dialog(session, &self.steps()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::testing::{Reply, ScriptedShell};
    use crate::driver::params::{TransferProtocol, TransferSettings};

    fn context(version: Version, protocol: TransferProtocol) -> SessionContext {
        let mut ctx = SessionContext::new(
            "10.1.1.10",
            "ciscocm-latest-copfile-495.k3.cop.sgn",
            TransferSettings::new(protocol, "/cop_files/current/", "192.168.0.15", "copuser", "coppass"),
        );
        ctx.version = version;
        ctx
    }

    fn location_script(choice: &str) -> ScriptedShell {
        ScriptedShell::new()
            .on(choice, Reply::text("Directory:"))
            .on("/cop_files/current/", Reply::text("Server:"))
            .on("192.168.0.15", Reply::text("User Name:"))
            .on("copuser", Reply::text("Password:"))
            .on("coppass", Reply::text("Please enter SMTP Host Server (optional):"))
    }

    #[tokio::test]
    async fn test_v11_dialog() {
        let ctx = context(Version::V11, TransferProtocol::Sftp);
        let shell = location_script("1");
        let sent = shell.sent();
        let mut session = ChannelSession::new(shell);

        TransferConfigurator::new(&ctx, Duration::from_secs(1))
            .run(&mut session)
            .await
            .unwrap();

        assert_eq!(
            sent.lines(),
            vec!["1", "/cop_files/current/", "192.168.0.15", "copuser", "coppass", ""]
        );
    }

    #[tokio::test]
    async fn test_v12_dialog_declines_follow_up_actions() {
        let mut ctx = SessionContext::new(
            "10.1.1.10",
            "ciscocm-latest-copfile-495.k3.cop.sgn",
            TransferSettings::new(
                TransferProtocol::Ftp,
                "/cop_files/current/",
                "192.168.0.15",
                "copuser",
                "coppass",
            )
            .with_smtp_host("smtp.example.com"),
        );
        ctx.version = Version::V12;
        let shell = location_script("2")
            .on("smtp.example.com", Reply::text("Continue with upgrade after download (yes/no):"))
            .on("no", Reply::text("Switch-version server after upgrade (yes/no):"));
        let sent = shell.sent();
        let mut session = ChannelSession::new(shell);

        TransferConfigurator::new(&ctx, Duration::from_secs(1))
            .run(&mut session)
            .await
            .unwrap();

        let lines = sent.lines();
        assert_eq!(lines[0], "2");
        assert_eq!(&lines[5..], ["smtp.example.com", "no", "no"]);
    }

    #[tokio::test]
    async fn test_missing_prompt_times_out() {
        let ctx = context(Version::V11, TransferProtocol::Sftp);
        let shell = ScriptedShell::new().on("1", Reply::text("Invalid selection"));
        let mut session = ChannelSession::new(shell);

        let err = TransferConfigurator::new(&ctx, Duration::from_millis(50))
            .run(&mut session)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_password_step_is_hidden() {
        let ctx = context(Version::V11, TransferProtocol::Sftp);
        let steps = TransferConfigurator::new(&ctx, Duration::from_secs(5)).steps();
        assert_eq!(steps.len(), 6);
        assert!(steps[4].hidden);
        assert!(steps.iter().filter(|s| s.hidden).count() == 1);
    }
}
