//! In-memory [`ClusterApi`] for tests.
//!
//! Mutations append to a call log so tests can assert that nothing was
//! submitted, or the order in which things were submitted.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::ClusterApi;
use crate::error::RosaError;
use crate::model::{
    BreakGlassCredential, BreakGlassCredentialRequest, BreakGlassStatus, Cluster, ClusterState,
    DnsDomain, ExternalAuth, ExternalAuthConfig, Hypershift, MachineType, NodePool,
    NodePoolUpgradePolicy, TuningConfig, UpgradePolicyState, UpgradeStateValue, Version,
    VersionRef,
};

#[derive(Default)]
struct State {
    clusters: Vec<Cluster>,
    node_pools: Vec<(String, NodePool)>,
    versions: Vec<Version>,
    policies: Vec<(String, NodePoolUpgradePolicy)>,
    credentials: Vec<(String, BreakGlassCredential)>,
    /// Scripted responses for credential reads, consumed before `credentials`.
    credential_script: VecDeque<crate::Result<BreakGlassCredential>>,
    external_auths: Vec<(String, ExternalAuth)>,
    tuning_configs: Vec<(String, TuningConfig)>,
    dns_domains: Vec<DnsDomain>,
    machine_types: Vec<MachineType>,
    calls: Vec<String>,
    next_id: u32,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

/// A ready hosted-control-plane cluster named `cluster1` on 4.12.26.
pub fn hosted_cluster() -> Cluster {
    Cluster {
        id: "24vf9iitg3p6tlml88iml6j6mu095mh8".to_string(),
        name: "cluster1".to_string(),
        state: ClusterState::Ready,
        hypershift: Hypershift { enabled: true },
        external_auth_config: ExternalAuthConfig { enabled: true },
        version: VersionRef {
            id: "openshift-v4.12.26".to_string(),
            raw_id: "4.12.26".to_string(),
            channel_group: "stable".to_string(),
        },
    }
}

pub fn version(raw: &str) -> Version {
    Version {
        id: format!("openshift-v{}", raw),
        raw_id: raw.to_string(),
        channel_group: "stable".to_string(),
        enabled: true,
        hosted_control_plane_enabled: true,
    }
}

pub fn node_pool(id: &str, raw: &str) -> NodePool {
    NodePool {
        id: id.to_string(),
        version: VersionRef {
            id: format!("openshift-v{}", raw),
            raw_id: raw.to_string(),
            channel_group: String::new(),
        },
    }
}

pub fn credential(id: &str, status: BreakGlassStatus, kubeconfig: &str) -> BreakGlassCredential {
    BreakGlassCredential {
        id: id.to_string(),
        username: "admin".to_string(),
        status,
        expiration_timestamp: None,
        revocation_timestamp: None,
        kubeconfig: kubeconfig.to_string(),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn with_cluster(self, cluster: Cluster) -> Self {
        self.lock().clusters.push(cluster);
        self
    }

    pub fn with_node_pool(self, cluster_id: &str, pool: NodePool) -> Self {
        self.lock().node_pools.push((cluster_id.to_string(), pool));
        self
    }

    pub fn with_versions(self, versions: Vec<Version>) -> Self {
        self.lock().versions = versions;
        self
    }

    pub fn with_policy(self, cluster_id: &str, policy: NodePoolUpgradePolicy) -> Self {
        self.lock().policies.push((cluster_id.to_string(), policy));
        self
    }

    pub fn with_credential(self, cluster_id: &str, cred: BreakGlassCredential) -> Self {
        self.lock().credentials.push((cluster_id.to_string(), cred));
        self
    }

    pub fn with_external_auth(self, cluster_id: &str, auth: ExternalAuth) -> Self {
        self.lock().external_auths.push((cluster_id.to_string(), auth));
        self
    }

    pub fn with_tuning_config(self, cluster_id: &str, config: TuningConfig) -> Self {
        self.lock().tuning_configs.push((cluster_id.to_string(), config));
        self
    }

    pub fn with_dns_domain(self, domain: DnsDomain) -> Self {
        self.lock().dns_domains.push(domain);
        self
    }

    pub fn with_machine_types(self, types: Vec<MachineType>) -> Self {
        self.lock().machine_types = types;
        self
    }

    /// Queue responses returned by successive credential reads.
    pub fn script_credential_reads(&self, responses: Vec<crate::Result<BreakGlassCredential>>) {
        self.lock().credential_script.extend(responses);
    }

    /// Mutating calls in order, e.g. `schedule_upgrade:np1`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn credential_reads(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.starts_with("get_break_glass"))
            .count()
    }

    fn record(&self, call: String) {
        self.lock().calls.push(call);
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        format!("{}{}", prefix, state.next_id)
    }
}

#[async_trait]
impl ClusterApi for FakeApi {
    async fn get_cluster(&self, key: &str) -> crate::Result<Cluster> {
        self.lock()
            .clusters
            .iter()
            .find(|c| c.matches_key(key))
            .cloned()
            .ok_or_else(|| {
                RosaError::NotFound(format!(
                    "There is no cluster with identifier or name '{}'",
                    key
                ))
            })
    }

    async fn get_node_pool(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
    ) -> crate::Result<Option<NodePool>> {
        Ok(self
            .lock()
            .node_pools
            .iter()
            .find(|(c, p)| c == cluster_id && p.id == node_pool_id)
            .map(|(_, p)| p.clone()))
    }

    async fn list_versions(&self, channel_group: &str) -> crate::Result<Vec<Version>> {
        Ok(self
            .lock()
            .versions
            .iter()
            .filter(|v| v.channel_group == channel_group)
            .cloned()
            .collect())
    }

    async fn list_node_pool_upgrade_policies(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
    ) -> crate::Result<Vec<NodePoolUpgradePolicy>> {
        Ok(self
            .lock()
            .policies
            .iter()
            .filter(|(c, p)| c == cluster_id && p.node_pool_id == node_pool_id)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn schedule_node_pool_upgrade(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
        policy: &NodePoolUpgradePolicy,
    ) -> crate::Result<NodePoolUpgradePolicy> {
        self.record(format!("schedule_upgrade:{}", node_pool_id));
        let mut stored = policy.clone();
        stored.id = self.next_id("policy-");
        stored.state = Some(UpgradePolicyState {
            value: UpgradeStateValue::Scheduled,
            description: String::new(),
        });
        self.lock()
            .policies
            .push((cluster_id.to_string(), stored.clone()));
        Ok(stored)
    }

    async fn list_break_glass_credentials(
        &self,
        cluster_id: &str,
    ) -> crate::Result<Vec<BreakGlassCredential>> {
        Ok(self
            .lock()
            .credentials
            .iter()
            .filter(|(c, _)| c == cluster_id)
            .map(|(_, b)| b.clone())
            .collect())
    }

    async fn get_break_glass_credential(
        &self,
        cluster_id: &str,
        credential_id: &str,
    ) -> crate::Result<BreakGlassCredential> {
        self.record(format!("get_break_glass:{}", credential_id));
        if let Some(scripted) = self.lock().credential_script.pop_front() {
            return scripted;
        }
        self.lock()
            .credentials
            .iter()
            .find(|(c, b)| c == cluster_id && b.id == credential_id)
            .map(|(_, b)| b.clone())
            .ok_or_else(|| {
                RosaError::NotFound(format!(
                    "Break glass credential '{}' not found",
                    credential_id
                ))
            })
    }

    async fn create_break_glass_credential(
        &self,
        cluster_id: &str,
        request: &BreakGlassCredentialRequest,
    ) -> crate::Result<BreakGlassCredential> {
        self.record("create_break_glass".to_string());
        let created = BreakGlassCredential {
            id: self.next_id("bgc-"),
            username: request.username.clone().unwrap_or_else(|| "generated".to_string()),
            status: BreakGlassStatus::Created,
            expiration_timestamp: request.expiration_timestamp,
            revocation_timestamp: None,
            kubeconfig: String::new(),
        };
        self.lock()
            .credentials
            .push((cluster_id.to_string(), created.clone()));
        Ok(created)
    }

    async fn revoke_break_glass_credentials(&self, cluster_id: &str) -> crate::Result<()> {
        self.record("revoke_break_glass".to_string());
        let now = Utc::now();
        for (c, cred) in self.lock().credentials.iter_mut() {
            if c == cluster_id && cred.status != BreakGlassStatus::Revoked {
                cred.status = BreakGlassStatus::Revoked;
                cred.revocation_timestamp = Some(now);
            }
        }
        Ok(())
    }

    async fn list_external_auths(&self, cluster_id: &str) -> crate::Result<Vec<ExternalAuth>> {
        Ok(self
            .lock()
            .external_auths
            .iter()
            .filter(|(c, _)| c == cluster_id)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn get_external_auth(&self, cluster_id: &str, id: &str) -> crate::Result<ExternalAuth> {
        self.lock()
            .external_auths
            .iter()
            .find(|(c, a)| c == cluster_id && a.id == id)
            .map(|(_, a)| a.clone())
            .ok_or_else(|| {
                RosaError::NotFound(format!("External authentication provider '{}' not found", id))
            })
    }

    async fn create_external_auth(
        &self,
        cluster_id: &str,
        auth: &ExternalAuth,
    ) -> crate::Result<ExternalAuth> {
        self.record(format!("create_external_auth:{}", auth.id));
        self.lock()
            .external_auths
            .push((cluster_id.to_string(), auth.clone()));
        Ok(auth.clone())
    }

    async fn update_external_auth(
        &self,
        cluster_id: &str,
        auth: &ExternalAuth,
    ) -> crate::Result<ExternalAuth> {
        self.record(format!("update_external_auth:{}", auth.id));
        let mut state = self.lock();
        match state
            .external_auths
            .iter_mut()
            .find(|(c, a)| c == cluster_id && a.id == auth.id)
        {
            Some((_, existing)) => {
                *existing = auth.clone();
                Ok(auth.clone())
            }
            None => Err(RosaError::NotFound(format!(
                "External authentication provider '{}' not found",
                auth.id
            ))),
        }
    }

    async fn delete_external_auth(&self, cluster_id: &str, id: &str) -> crate::Result<()> {
        self.record(format!("delete_external_auth:{}", id));
        self.lock()
            .external_auths
            .retain(|(c, a)| !(c == cluster_id && a.id == id));
        Ok(())
    }

    async fn list_tuning_configs(&self, cluster_id: &str) -> crate::Result<Vec<TuningConfig>> {
        Ok(self
            .lock()
            .tuning_configs
            .iter()
            .filter(|(c, _)| c == cluster_id)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn get_tuning_config(&self, cluster_id: &str, id: &str) -> crate::Result<TuningConfig> {
        self.lock()
            .tuning_configs
            .iter()
            .find(|(c, t)| c == cluster_id && t.id == id)
            .map(|(_, t)| t.clone())
            .ok_or_else(|| RosaError::NotFound(format!("Tuning config '{}' not found", id)))
    }

    async fn create_tuning_config(
        &self,
        cluster_id: &str,
        config: &TuningConfig,
    ) -> crate::Result<TuningConfig> {
        self.record(format!("create_tuning_config:{}", config.name));
        let mut stored = config.clone();
        stored.id = self.next_id("tc-");
        self.lock()
            .tuning_configs
            .push((cluster_id.to_string(), stored.clone()));
        Ok(stored)
    }

    async fn update_tuning_config(
        &self,
        cluster_id: &str,
        config: &TuningConfig,
    ) -> crate::Result<TuningConfig> {
        self.record(format!("update_tuning_config:{}", config.id));
        let mut state = self.lock();
        match state
            .tuning_configs
            .iter_mut()
            .find(|(c, t)| c == cluster_id && t.id == config.id)
        {
            Some((_, existing)) => {
                existing.spec = config.spec.clone();
                Ok(existing.clone())
            }
            None => Err(RosaError::NotFound(format!(
                "Tuning config '{}' not found",
                config.id
            ))),
        }
    }

    async fn delete_tuning_config(&self, cluster_id: &str, id: &str) -> crate::Result<()> {
        self.record(format!("delete_tuning_config:{}", id));
        self.lock()
            .tuning_configs
            .retain(|(c, t)| !(c == cluster_id && t.id == id));
        Ok(())
    }

    async fn create_dns_domain(&self, domain: &DnsDomain) -> crate::Result<DnsDomain> {
        self.record(format!("create_dns_domain:{}", domain.cluster_arch));
        let mut stored = domain.clone();
        stored.id = format!("{}.p1.openshiftapps.com", self.next_id("dom"));
        stored.user_defined = true;
        self.lock().dns_domains.push(stored.clone());
        Ok(stored)
    }

    async fn list_dns_domains(&self) -> crate::Result<Vec<DnsDomain>> {
        Ok(self.lock().dns_domains.clone())
    }

    async fn delete_dns_domain(&self, id: &str) -> crate::Result<()> {
        self.record(format!("delete_dns_domain:{}", id));
        let mut state = self.lock();
        let before = state.dns_domains.len();
        state.dns_domains.retain(|d| d.id != id);
        if state.dns_domains.len() == before {
            return Err(RosaError::NotFound(format!("DNS domain '{}' not found", id)));
        }
        Ok(())
    }

    async fn list_machine_types(&self) -> crate::Result<Vec<MachineType>> {
        Ok(self.lock().machine_types.clone())
    }
}
