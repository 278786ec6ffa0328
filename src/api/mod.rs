//! Remote cluster-management API.
//!
//! [`ClusterApi`] is the seam between the orchestration layer and the
//! transport. [`http::OcmClient`] talks to the real service; tests use an
//! in-memory fake that records every mutating call.

pub mod http;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

use crate::model::{
    BreakGlassCredential, BreakGlassCredentialRequest, Cluster, DnsDomain, ExternalAuth,
    MachineType, NodePool, NodePoolUpgradePolicy, TuningConfig, Version,
};

/// Capabilities of the cluster-management service consumed by the commands.
///
/// Implementations map "resource does not exist" to `RosaError::NotFound`,
/// retryable transport failures to `RosaError::Transient`, and any other
/// server rejection to `RosaError::Remote` carrying the server's reason.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Look up a cluster by id or name.
    async fn get_cluster(&self, key: &str) -> crate::Result<Cluster>;

    /// `None` when the node pool does not exist.
    async fn get_node_pool(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
    ) -> crate::Result<Option<NodePool>>;

    /// Enabled versions of a channel group, in server order.
    async fn list_versions(&self, channel_group: &str) -> crate::Result<Vec<Version>>;

    async fn list_node_pool_upgrade_policies(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
    ) -> crate::Result<Vec<NodePoolUpgradePolicy>>;

    async fn schedule_node_pool_upgrade(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
        policy: &NodePoolUpgradePolicy,
    ) -> crate::Result<NodePoolUpgradePolicy>;

    async fn list_break_glass_credentials(
        &self,
        cluster_id: &str,
    ) -> crate::Result<Vec<BreakGlassCredential>>;

    async fn get_break_glass_credential(
        &self,
        cluster_id: &str,
        credential_id: &str,
    ) -> crate::Result<BreakGlassCredential>;

    async fn create_break_glass_credential(
        &self,
        cluster_id: &str,
        request: &BreakGlassCredentialRequest,
    ) -> crate::Result<BreakGlassCredential>;

    /// Revoke every credential of the cluster.
    async fn revoke_break_glass_credentials(&self, cluster_id: &str) -> crate::Result<()>;

    async fn list_external_auths(&self, cluster_id: &str) -> crate::Result<Vec<ExternalAuth>>;

    async fn get_external_auth(&self, cluster_id: &str, id: &str) -> crate::Result<ExternalAuth>;

    async fn create_external_auth(
        &self,
        cluster_id: &str,
        auth: &ExternalAuth,
    ) -> crate::Result<ExternalAuth>;

    async fn update_external_auth(
        &self,
        cluster_id: &str,
        auth: &ExternalAuth,
    ) -> crate::Result<ExternalAuth>;

    async fn delete_external_auth(&self, cluster_id: &str, id: &str) -> crate::Result<()>;

    async fn list_tuning_configs(&self, cluster_id: &str) -> crate::Result<Vec<TuningConfig>>;

    async fn get_tuning_config(&self, cluster_id: &str, id: &str) -> crate::Result<TuningConfig>;

    async fn create_tuning_config(
        &self,
        cluster_id: &str,
        config: &TuningConfig,
    ) -> crate::Result<TuningConfig>;

    async fn update_tuning_config(
        &self,
        cluster_id: &str,
        config: &TuningConfig,
    ) -> crate::Result<TuningConfig>;

    async fn delete_tuning_config(&self, cluster_id: &str, id: &str) -> crate::Result<()>;

    async fn create_dns_domain(&self, domain: &DnsDomain) -> crate::Result<DnsDomain>;

    async fn list_dns_domains(&self) -> crate::Result<Vec<DnsDomain>>;

    async fn delete_dns_domain(&self, id: &str) -> crate::Result<()>;

    async fn list_machine_types(&self) -> crate::Result<Vec<MachineType>>;
}
