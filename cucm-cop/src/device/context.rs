//! Per-invocation session context.

use std::fmt;

use crate::driver::params::TransferSettings;

/// Major software version of the CallManager node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Version {
    #[default]
    Unknown,
    V11,
    V12,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Unknown => f.write_str("unknown"),
            Version::V11 => f.write_str("11.x"),
            Version::V12 => f.write_str("12.x"),
        }
    }
}

/// Cluster role of the node (publisher or subscriber).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeRole {
    #[default]
    Unknown,
    Primary,
    Secondary,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Unknown => f.write_str("unknown"),
            NodeRole::Primary => f.write_str("primary"),
            NodeRole::Secondary => f.write_str("secondary"),
        }
    }
}

/// State carried through one upgrade procedure.
///
/// Created from the parameters before the procedure starts. Only the device
/// inspection step writes `version`, `role` and `node_name`; every driver
/// afterwards reads it through a shared reference.
#[derive(Debug)]
pub struct SessionContext {
    /// Address the SSH session was opened to.
    pub target_address: String,

    /// COP file name, signed extension included.
    pub filename: String,

    /// Where and how the COP file is fetched.
    pub transfer: TransferSettings,

    /// Restart the node after a successful install.
    pub reboot: bool,

    /// Write a transcript of the session.
    pub logging: bool,

    pub version: Version,
    pub role: NodeRole,
    pub node_name: Option<String>,
}

impl SessionContext {
    /// Create a context with nothing detected yet.
    pub fn new(
        target_address: impl Into<String>,
        filename: impl Into<String>,
        transfer: TransferSettings,
    ) -> Self {
        Self {
            target_address: target_address.into(),
            filename: filename.into(),
            transfer,
            reboot: false,
            logging: false,
            version: Version::Unknown,
            role: NodeRole::Unknown,
            node_name: None,
        }
    }

    /// Set the reboot flag.
    pub fn with_reboot(mut self, reboot: bool) -> Self {
        self.reboot = reboot;
        self
    }

    /// Set the logging flag.
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// File name without the `.sgn` signature extension, as it appears in
    /// the active version report once installed.
    pub fn installed_name(&self) -> &str {
        self.filename
            .strip_suffix(".sgn")
            .unwrap_or(&self.filename)
    }

    /// Whether the v12 secondary-node dialog variant applies.
    pub fn is_v12_secondary(&self) -> bool {
        self.version == Version::V12 && self.role == NodeRole::Secondary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::params::TransferProtocol;

    #[test]
    fn test_installed_name() {
        let ctx = SessionContext::new(
            "10.1.1.10",
            "ciscocm-latest-copfile-495.k3.cop.sgn",
            TransferSettings::new(TransferProtocol::Sftp, "/cop", "10.10.10.5", "u", "p"),
        );
        assert_eq!(ctx.installed_name(), "ciscocm-latest-copfile-495.k3.cop");
        assert_eq!(ctx.version, Version::Unknown);
        assert_eq!(ctx.role, NodeRole::Unknown);
        assert!(!ctx.is_v12_secondary());
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::V12.to_string(), "12.x");
        assert_eq!(NodeRole::Secondary.to_string(), "secondary");
    }
}
