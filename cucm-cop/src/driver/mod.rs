//! COP upgrade drivers.
//!
//! Each stage of the upgrade dialog has its own driver working on a shared
//! [`ChannelSession`](crate::channel::ChannelSession):
//!
//! - [`TransferConfigurator`] answers the remote location questions
//! - [`InstallDriver`] selects the file and confirms the installation
//! - [`RebootDriver`] restarts the node when asked to
//!
//! [`UpgradeProcedure`] sequences them, and [`CopUploadBuilder`] wraps the
//! whole job including the SSH connection.

mod builder;
pub mod install;
mod interactive;
mod outcome;
pub mod params;
mod procedure;
pub mod reboot;
mod transfer;

pub use builder::{CopUpload, CopUploadBuilder};
pub use install::{InstallDriver, InstallFailure, InstallState};
pub use interactive::{run_dialog, DialogBuilder, DialogBuilderWithInput, DialogStep};
pub use outcome::Outcome;
pub use params::{Timeouts, TransferProtocol, TransferSettings, UpgradeParams};
pub use procedure::UpgradeProcedure;
pub use reboot::{RebootDriver, RebootState};
pub use transfer::TransferConfigurator;
