//! Device classification: software version, node identity and node role.
//!
//! The node does not expose a single "am I the publisher" query, so the role
//! is resolved in two steps: the hosts table maps the target address to the
//! names the node is known by, the process-node table tells which of those
//! names is configured, and the call-processing usage value of that node
//! decides the role.

use std::time::Duration;

use log::{debug, info, warn};

use super::context::{NodeRole, Version};
use super::prompts;
use crate::channel::{ChannelSession, ShellStream};
use crate::error::Result;

/// Runs read-only queries against the node through the command prompt.
pub struct DeviceInspector<'a, S> {
    session: &'a mut ChannelSession<S>,
    timeout: Duration,
}

impl<'a, S: ShellStream> DeviceInspector<'a, S> {
    /// Create an inspector; `timeout` applies to each query.
    pub fn new(session: &'a mut ChannelSession<S>, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    /// Run a query command and return its cleaned output.
    async fn query(&mut self, command: &str) -> Result<String> {
        let found = self
            .session
            .command(command, &prompts::command_prompt(), self.timeout)
            .await?;
        Ok(found.output)
    }

    /// Output of `show version active`.
    pub async fn active_version_report(&mut self) -> Result<String> {
        self.query(prompts::SHOW_VERSION_ACTIVE).await
    }

    /// Detect the major software version.
    pub async fn detect_version(&mut self) -> Result<Version> {
        let report = self.active_version_report().await?;
        let version = classify_version(&report);
        if version == Version::Unknown {
            warn!("Unrecognized active version report, continuing as unknown version");
        } else {
            info!("Detected version {}", version);
        }
        Ok(version)
    }

    /// Resolve the configured process-node name of `target_address`.
    pub async fn detect_node_name(&mut self, target_address: &str) -> Result<Option<String>> {
        let hosts = self.query(prompts::SHOW_NETWORK_HOSTS).await?;
        let candidates = candidate_names(&hosts, target_address);
        debug!("name candidates for {}: {:?}", target_address, candidates);

        let nodes = self.query(prompts::LIST_PROCESS_NODES).await?;
        Ok(match_node_name(&candidates, &nodes))
    }

    /// Query the call-processing usage value of node `name`.
    pub async fn resolve_role(&mut self, name: &str) -> Result<NodeRole> {
        let output = self.query(&prompts::node_usage_query(name)).await?;
        Ok(classify_role(&output))
    }

    /// Resolve the node name and, when found, its role.
    ///
    /// An unresolved identity leaves the role unknown.
    pub async fn detect_role(&mut self, target_address: &str) -> Result<(Option<String>, NodeRole)> {
        let Some(name) = self.detect_node_name(target_address).await? else {
            warn!("No process node matches {}, node role unknown", target_address);
            return Ok((None, NodeRole::Unknown));
        };

        let role = self.resolve_role(&name).await?;
        info!("Node {} is {}", name, role);
        Ok((Some(name), role))
    }
}

/// Classify the `Active Master Version:` line of a version report.
pub fn classify_version(report: &str) -> Version {
    let Some(value) = report.lines().find_map(|line| {
        line.find(prompts::ACTIVE_VERSION_LABEL)
            .map(|pos| &line[pos + prompts::ACTIVE_VERSION_LABEL.len()..])
    }) else {
        return Version::Unknown;
    };

    let major: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let has_minor = value.trim_start()[major.len()..].starts_with('.');

    match (major.as_str(), has_minor) {
        ("11", true) => Version::V11,
        ("12", true) => Version::V12,
        _ => Version::Unknown,
    }
}

/// Whether the report lists the COP file (signature extension stripped).
pub fn is_installed(report: &str, installed_name: &str) -> bool {
    !installed_name.is_empty() && report.lines().any(|line| line.contains(installed_name))
}

/// Names (IP, FQDN, hostname) of the hosts-table entry for `address`.
pub fn candidate_names(hosts: &str, address: &str) -> Vec<String> {
    hosts
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|tokens| tokens.contains(&address))
        .map(|tokens| tokens.into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

/// First process-node name equal (case-insensitively) to a candidate.
pub fn match_node_name(candidates: &[String], nodes: &str) -> Option<String> {
    candidates
        .iter()
        .filter(|c| !c.is_empty())
        .find_map(|candidate| {
            nodes
                .lines()
                .map(str::trim)
                .find(|node| node.eq_ignore_ascii_case(candidate))
                .map(str::to_string)
        })
}

/// A usage value of `0` marks the primary (publisher) node.
pub fn classify_role(output: &str) -> NodeRole {
    let mut values = output
        .lines()
        .map(str::trim)
        .skip_while(|line| !is_separator(line))
        .skip(1)
        .take_while(|line| !line.starts_with(prompts::COMMAND_PROMPT))
        .filter(|line| !line.is_empty());

    if values.any(|value| value == "0") {
        NodeRole::Primary
    } else {
        NodeRole::Secondary
    }
}

/// Underline row of `run sql` output headers.
fn is_separator(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '=' || c == ' ')
}
