//! CallManager administrator CLI commands and prompt texts.
//!
//! The device text is fixed from the automation's point of view, so these
//! literals must match the CLI output verbatim.
//!
//! # Upgrade dialog (v12, secondary node)
//!
//! ```text
//! admin:utils system upgrade initiate
//! Would you like to download credentials ...? (yes/no): no
//! Source:
//! 1) Remote Filesystem via SFTP
//! 2) Remote Filesystem via FTP
//! 3) Local DVD/CD
//! q) quit
//! Please select an option (1 - 3 or "q" ): 1
//! Directory: /cop_files/current
//! Server: 10.10.10.5
//! User Name: copuser
//! Password:
//! Please enter SMTP Host Server (optional):
//! Continue with upgrade after download (yes/no): no
//! Switch-version server after upgrade (yes/no): no
//! ...
//! Please select an option (1 - 3 or "q" ): 3
//! Start installation (yes/no): yes
//! ...
//! Successfully installed ciscocm-latest-copfile-495.k3.cop.sgn
//! ```

use crate::channel::PatternSet;

/// Administrator CLI command prompt.
pub const COMMAND_PROMPT: &str = "admin:";

/// Option menus of the upgrade dialog (source selection and file listing).
pub const OPTION_MENU: &str = "Please select an option";

/// Offered when another session already holds the upgrade workflow.
pub const ASSUME_CONTROL: &str = "Assume control";

/// Credentials download question asked on v12 secondary nodes.
pub const DOWNLOAD_CREDENTIALS: &str = "download credentials";

pub const DIRECTORY: &str = "Directory";
pub const SERVER: &str = "Server";
pub const USER_NAME: &str = "User Name";
pub const PASSWORD: &str = "Password";
pub const SMTP_HOST: &str = "Please enter SMTP Host Server";

/// v12 only.
pub const CONTINUE_AFTER_DOWNLOAD: &str = "Continue with upgrade after download";
/// v12 only.
pub const SWITCH_VERSION: &str = "Switch-version server after upgrade";

pub const START_INSTALLATION: &str = "Start installation";
pub const SUCCESSFULLY_INSTALLED: &str = "Successfully installed";

pub const YES_NO: &str = "(yes/no)";
pub const RESTART: &str = "restart";
pub const REBOOT_NOW: &str = "The system is going down for reboot NOW!";

/// Label of the active version line in `show version active`.
pub const ACTIVE_VERSION_LABEL: &str = "Active Master Version: ";

pub const YES: &str = "yes";
pub const NO: &str = "no";

pub const SHOW_VERSION_ACTIVE: &str = "show version active";
pub const SHOW_NETWORK_HOSTS: &str = "show tech network hosts";
pub const LIST_PROCESS_NODES: &str = "run sql select name from processnode";
pub const UPGRADE_CANCEL: &str = "utils system upgrade cancel";
pub const UPGRADE_INITIATE: &str = "utils system upgrade initiate";
pub const SYSTEM_RESTART: &str = "utils system restart";

/// Query for the call-processing usage value of a process node.
pub fn node_usage_query(name: &str) -> String {
    format!(
        "run sql SELECT processnode.tknodeusage from callmanager LEFT JOIN processnode \
         on callmanager.fkprocessnode=processnode.pkid WHERE processnode.name=\"{}\"",
        name
    )
}

/// The bare command prompt.
pub fn command_prompt() -> PatternSet {
    PatternSet::literal(COMMAND_PROMPT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_usage_query() {
        assert_eq!(
            node_usage_query("cucm-sub1"),
            "run sql SELECT processnode.tknodeusage from callmanager LEFT JOIN processnode on \
             callmanager.fkprocessnode=processnode.pkid WHERE processnode.name=\"cucm-sub1\""
        );
    }

    #[test]
    fn test_command_prompt_matches_cli() {
        assert!(command_prompt().find("Active Master Version: 11.5.1\nadmin:").is_some());
        assert!(command_prompt().find("Please select an option").is_none());
    }
}
