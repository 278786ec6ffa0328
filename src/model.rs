//! Wire types for the cluster-management API.
//!
//! Request payloads omit empty fields entirely (`skip_serializing_if`), since
//! the server treats an explicit zero value as meaningful.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a cluster as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterState {
    Error,
    Hibernating,
    Installing,
    Pending,
    PoweringDown,
    Ready,
    Resuming,
    Uninstalling,
    Validating,
    Waiting,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClusterState::Error => "error",
            ClusterState::Hibernating => "hibernating",
            ClusterState::Installing => "installing",
            ClusterState::Pending => "pending",
            ClusterState::PoweringDown => "powering_down",
            ClusterState::Ready => "ready",
            ClusterState::Resuming => "resuming",
            ClusterState::Uninstalling => "uninstalling",
            ClusterState::Validating => "validating",
            ClusterState::Waiting => "waiting",
            ClusterState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypershift {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAuthConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Version reference embedded in clusters and node pools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel_group: String,
}

/// Read-only view of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub state: ClusterState,
    #[serde(default)]
    pub hypershift: Hypershift,
    #[serde(default)]
    pub external_auth_config: ExternalAuthConfig,
    #[serde(default)]
    pub version: VersionRef,
}

impl Cluster {
    pub fn is_ready(&self) -> bool {
        self.state == ClusterState::Ready
    }

    pub fn is_hosted_control_plane(&self) -> bool {
        self.hypershift.enabled
    }

    pub fn external_auth_enabled(&self) -> bool {
        self.external_auth_config.enabled
    }

    /// Channel group the cluster's versions are drawn from, `stable` when unset.
    pub fn channel_group(&self) -> &str {
        if self.version.channel_group.is_empty() {
            "stable"
        } else {
            &self.version.channel_group
        }
    }

    /// Does `key` identify this cluster (by id or name)?
    pub fn matches_key(&self, key: &str) -> bool {
        self.id == key || self.name == key
    }
}

/// A worker node pool of a hosted cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePool {
    pub id: String,
    #[serde(default)]
    pub version: VersionRef,
}

/// Installable OpenShift version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    #[serde(default)]
    pub raw_id: String,
    #[serde(default)]
    pub channel_group: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub hosted_control_plane_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Manual,
    Automatic,
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleType::Manual => f.write_str("manual"),
            ScheduleType::Automatic => f.write_str("automatic"),
        }
    }
}

/// Server-side progress of a scheduled upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeStateValue {
    Pending,
    Scheduled,
    Started,
    Delayed,
    Completed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl UpgradeStateValue {
    /// States after which the node pool accepts a new upgrade policy.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            UpgradeStateValue::Completed | UpgradeStateValue::Failed | UpgradeStateValue::Cancelled
        )
    }
}

impl fmt::Display for UpgradeStateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpgradeStateValue::Pending => "pending",
            UpgradeStateValue::Scheduled => "scheduled",
            UpgradeStateValue::Started => "started",
            UpgradeStateValue::Delayed => "delayed",
            UpgradeStateValue::Completed => "completed",
            UpgradeStateValue::Failed => "failed",
            UpgradeStateValue::Cancelled => "cancelled",
            UpgradeStateValue::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePolicyState {
    pub value: UpgradeStateValue,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Upgrade policy for one node pool, either a one-shot manual upgrade or a
/// cron schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePoolUpgradePolicy {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub node_pool_id: String,
    pub schedule_type: ScheduleType,
    #[serde(default = "default_upgrade_type")]
    pub upgrade_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schedule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_minor_version_upgrades: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<UpgradePolicyState>,
}

fn default_upgrade_type() -> String {
    "NodePool".to_string()
}

impl NodePoolUpgradePolicy {
    /// A manual one-shot upgrade to `version` at `next_run`.
    pub fn manual(node_pool_id: &str, version: &str, next_run: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            node_pool_id: node_pool_id.to_string(),
            schedule_type: ScheduleType::Manual,
            upgrade_type: default_upgrade_type(),
            version: version.to_string(),
            next_run: Some(next_run),
            schedule: String::new(),
            enable_minor_version_upgrades: None,
            state: None,
        }
    }

    /// A recurring upgrade to the latest version on a cron schedule.
    pub fn automatic(node_pool_id: &str, schedule: &str, allow_minor: bool) -> Self {
        Self {
            id: String::new(),
            node_pool_id: node_pool_id.to_string(),
            schedule_type: ScheduleType::Automatic,
            upgrade_type: default_upgrade_type(),
            version: String::new(),
            next_run: None,
            schedule: schedule.to_string(),
            enable_minor_version_upgrades: Some(allow_minor),
            state: None,
        }
    }

    /// Still waiting on or executing the upgrade.
    pub fn is_active(&self) -> bool {
        match &self.state {
            Some(state) => !state.value.is_finished(),
            None => true,
        }
    }
}

/// Break glass credential status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakGlassStatus {
    Created,
    Issued,
    AwaitingRevocation,
    Revoked,
    Expired,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BreakGlassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BreakGlassStatus::Created => "created",
            BreakGlassStatus::Issued => "issued",
            BreakGlassStatus::AwaitingRevocation => "awaiting_revocation",
            BreakGlassStatus::Revoked => "revoked",
            BreakGlassStatus::Expired => "expired",
            BreakGlassStatus::Failed => "failed",
            BreakGlassStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Server-assigned break glass credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakGlassCredential {
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub status: BreakGlassStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kubeconfig: String,
}

/// Create request for a break glass credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakGlassCredentialRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIssuer {
    pub url: String,
    #[serde(default)]
    pub audiences: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ca: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRef {
    pub claim: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimMappings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<ClaimRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<ClaimRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub claim: String,
    pub required_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<ClaimMappings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_rules: Vec<ValidationRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientComponent {
    pub name: String,
    pub namespace: String,
}

impl ClientComponent {
    /// The web console, the only client component the CLI configures.
    pub fn console() -> Self {
        Self {
            name: "console".to_string(),
            namespace: "openshift-console".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAuthClient {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
    pub component: ClientComponent,
}

/// External authentication (OIDC issuer) configuration of a hosted cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAuth {
    pub id: String,
    pub issuer: TokenIssuer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<TokenClaims>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<ExternalAuthClient>,
}

/// Named node tuning (TuneD) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub spec: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterArchitecture {
    Classic,
    Hcp,
}

impl fmt::Display for ClusterArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterArchitecture::Classic => f.write_str("classic"),
            ClusterArchitecture::Hcp => f.write_str("hcp"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(default)]
    pub id: String,
}

/// Base DNS domain reserved for a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsDomain {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub cluster_arch: ClusterArchitecture,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub user_defined: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ObjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

/// Cloud instance type usable for worker nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineType {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cpu: Quantity,
    #[serde(default)]
    pub memory: Quantity,
}

impl MachineType {
    /// Memory in GiB, the API reports bytes.
    pub fn memory_gib(&self) -> f64 {
        self.memory.value / (1024.0 * 1024.0 * 1024.0)
    }
}
