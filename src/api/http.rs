//! HTTP implementation of [`ClusterApi`] against the clusters_mgmt v1 REST API.
//!
//! Collections are paged; list calls walk every page. Non-2xx responses carry
//! an error document whose `reason` is surfaced to the user unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::ClusterApi;
use crate::config::RosaConfig;
use crate::error::RosaError;
use crate::model::{
    BreakGlassCredential, BreakGlassCredentialRequest, Cluster, DnsDomain, ExternalAuth,
    MachineType, NodePool, NodePoolUpgradePolicy, TuningConfig, Version,
};

const API_PREFIX: &str = "api/clusters_mgmt/v1";

/// Items requested per page when walking a collection.
const PAGE_SIZE: usize = 100;

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    reason: String,
}

/// Client for the cluster-management service.
pub struct OcmClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl OcmClient {
    /// Build a client from validated configuration.
    pub fn new(config: &RosaConfig) -> crate::Result<Self> {
        Self::with_parts(&config.api_url, config.resolve_token(), config.request_timeout())
    }

    pub fn with_parts(api_url: &str, token: String, timeout: Duration) -> crate::Result<Self> {
        let mut base_url = Url::parse(api_url)
            .map_err(|e| RosaError::Config("api_url".to_string(), e.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RosaError::Config("http client".to_string(), e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn url(&self, path: &str) -> crate::Result<Url> {
        self.base_url
            .join(&format!("{}/{}", API_PREFIX, path.trim_start_matches('/')))
            .map_err(|e| RosaError::Config("api_url".to_string(), e.to_string()))
    }

    fn request(&self, method: Method, path: &str) -> crate::Result<RequestBuilder> {
        let url = self.url(path)?;
        tracing::debug!(method = %method, url = %url, "api request");
        let builder = self.http.request(method, url);
        Ok(if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        })
    }

    async fn send(&self, builder: RequestBuilder) -> crate::Result<reqwest::Response> {
        let response = builder.send().await.map_err(classify_transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, body = %body, "api error response");
        Err(classify_status(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> crate::Result<T> {
        let response = self.send(self.request(Method::GET, path)?.query(query)).await?;
        response.json::<T>().await.map_err(classify_transport)
    }

    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        search: Option<String>,
    ) -> crate::Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page_number = 1usize;
        loop {
            let mut query = vec![
                ("page", page_number.to_string()),
                ("size", PAGE_SIZE.to_string()),
            ];
            if let Some(search) = &search {
                query.push(("search", search.clone()));
            }
            let page: Page<T> = self.get_json(path, &query).await?;
            let count = page.items.len();
            all.extend(page.items);
            if count < PAGE_SIZE {
                return Ok(all);
            }
            page_number += 1;
        }
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> crate::Result<T> {
        let response = self.send(self.request(method, path)?.json(body)).await?;
        response.json::<T>().await.map_err(classify_transport)
    }

    async fn delete(&self, path: &str) -> crate::Result<()> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}

/// Map a reqwest failure. Connection problems and timeouts are retryable.
fn classify_transport(err: reqwest::Error) -> RosaError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        RosaError::Transient(err.to_string())
    } else {
        RosaError::Remote(err.to_string())
    }
}

/// Map a non-2xx response to an error kind.
fn classify_status(status: StatusCode, body: &str) -> RosaError {
    let reason = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.reason)
        .unwrap_or_default();
    let message = if reason.is_empty() {
        format!("status {}", status)
    } else {
        reason
    };
    if status == StatusCode::NOT_FOUND {
        RosaError::NotFound(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        RosaError::Transient(message)
    } else {
        RosaError::Remote(message)
    }
}

fn not_found_to_none<T>(result: crate::Result<T>) -> crate::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RosaError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl ClusterApi for OcmClient {
    async fn get_cluster(&self, key: &str) -> crate::Result<Cluster> {
        if key.is_empty() || key.contains('\'') {
            return Err(RosaError::Validation(format!(
                "Cluster name, identifier or external identifier '{}' isn't valid",
                key
            )));
        }
        let search = format!("id = '{0}' or name = '{0}' or external_id = '{0}'", key);
        let mut clusters: Vec<Cluster> = self.list_all("clusters", Some(search)).await?;
        match clusters.len() {
            0 => Err(RosaError::NotFound(format!(
                "There is no cluster with identifier or name '{}'",
                key
            ))),
            1 => Ok(clusters.remove(0)),
            n => Err(RosaError::Validation(format!(
                "There are {} clusters with identifier or name '{}'",
                n, key
            ))),
        }
    }

    async fn get_node_pool(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
    ) -> crate::Result<Option<NodePool>> {
        let path = format!("clusters/{}/node_pools/{}", cluster_id, node_pool_id);
        not_found_to_none(self.get_json(&path, &[]).await)
    }

    async fn list_versions(&self, channel_group: &str) -> crate::Result<Vec<Version>> {
        let search = format!("enabled = 'true' and channel_group = '{}'", channel_group);
        self.list_all("versions", Some(search)).await
    }

    async fn list_node_pool_upgrade_policies(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
    ) -> crate::Result<Vec<NodePoolUpgradePolicy>> {
        let path = format!(
            "clusters/{}/node_pools/{}/upgrade_policies",
            cluster_id, node_pool_id
        );
        self.list_all(&path, None).await
    }

    async fn schedule_node_pool_upgrade(
        &self,
        cluster_id: &str,
        node_pool_id: &str,
        policy: &NodePoolUpgradePolicy,
    ) -> crate::Result<NodePoolUpgradePolicy> {
        let path = format!(
            "clusters/{}/node_pools/{}/upgrade_policies",
            cluster_id, node_pool_id
        );
        self.send_json(Method::POST, &path, policy).await
    }

    async fn list_break_glass_credentials(
        &self,
        cluster_id: &str,
    ) -> crate::Result<Vec<BreakGlassCredential>> {
        let path = format!("clusters/{}/break_glass_credentials", cluster_id);
        self.list_all(&path, None).await
    }

    async fn get_break_glass_credential(
        &self,
        cluster_id: &str,
        credential_id: &str,
    ) -> crate::Result<BreakGlassCredential> {
        let path = format!(
            "clusters/{}/break_glass_credentials/{}",
            cluster_id, credential_id
        );
        self.get_json(&path, &[]).await
    }

    async fn create_break_glass_credential(
        &self,
        cluster_id: &str,
        request: &BreakGlassCredentialRequest,
    ) -> crate::Result<BreakGlassCredential> {
        let path = format!("clusters/{}/break_glass_credentials", cluster_id);
        self.send_json(Method::POST, &path, request).await
    }

    async fn revoke_break_glass_credentials(&self, cluster_id: &str) -> crate::Result<()> {
        self.delete(&format!("clusters/{}/break_glass_credentials", cluster_id))
            .await
    }

    async fn list_external_auths(&self, cluster_id: &str) -> crate::Result<Vec<ExternalAuth>> {
        let path = format!("clusters/{}/external_auth_config/external_auths", cluster_id);
        self.list_all(&path, None).await
    }

    async fn get_external_auth(&self, cluster_id: &str, id: &str) -> crate::Result<ExternalAuth> {
        let path = format!(
            "clusters/{}/external_auth_config/external_auths/{}",
            cluster_id, id
        );
        self.get_json(&path, &[]).await
    }

    async fn create_external_auth(
        &self,
        cluster_id: &str,
        auth: &ExternalAuth,
    ) -> crate::Result<ExternalAuth> {
        let path = format!("clusters/{}/external_auth_config/external_auths", cluster_id);
        self.send_json(Method::POST, &path, auth).await
    }

    async fn update_external_auth(
        &self,
        cluster_id: &str,
        auth: &ExternalAuth,
    ) -> crate::Result<ExternalAuth> {
        let path = format!(
            "clusters/{}/external_auth_config/external_auths/{}",
            cluster_id, auth.id
        );
        self.send_json(Method::PATCH, &path, auth).await
    }

    async fn delete_external_auth(&self, cluster_id: &str, id: &str) -> crate::Result<()> {
        self.delete(&format!(
            "clusters/{}/external_auth_config/external_auths/{}",
            cluster_id, id
        ))
        .await
    }

    async fn list_tuning_configs(&self, cluster_id: &str) -> crate::Result<Vec<TuningConfig>> {
        self.list_all(&format!("clusters/{}/tuning_configs", cluster_id), None)
            .await
    }

    async fn get_tuning_config(&self, cluster_id: &str, id: &str) -> crate::Result<TuningConfig> {
        self.get_json(&format!("clusters/{}/tuning_configs/{}", cluster_id, id), &[])
            .await
    }

    async fn create_tuning_config(
        &self,
        cluster_id: &str,
        config: &TuningConfig,
    ) -> crate::Result<TuningConfig> {
        let path = format!("clusters/{}/tuning_configs", cluster_id);
        self.send_json(Method::POST, &path, config).await
    }

    async fn update_tuning_config(
        &self,
        cluster_id: &str,
        config: &TuningConfig,
    ) -> crate::Result<TuningConfig> {
        let path = format!("clusters/{}/tuning_configs/{}", cluster_id, config.id);
        self.send_json(Method::PATCH, &path, config).await
    }

    async fn delete_tuning_config(&self, cluster_id: &str, id: &str) -> crate::Result<()> {
        self.delete(&format!("clusters/{}/tuning_configs/{}", cluster_id, id))
            .await
    }

    async fn create_dns_domain(&self, domain: &DnsDomain) -> crate::Result<DnsDomain> {
        self.send_json(Method::POST, "dns_domains", domain).await
    }

    async fn list_dns_domains(&self) -> crate::Result<Vec<DnsDomain>> {
        self.list_all("dns_domains", Some("user_defined = 'true'".to_string()))
            .await
    }

    async fn delete_dns_domain(&self, id: &str) -> crate::Result<()> {
        self.delete(&format!("dns_domains/{}", id)).await
    }

    async fn list_machine_types(&self) -> crate::Result<Vec<MachineType>> {
        self.list_all("machine_types", Some("cloud_provider.id = 'aws'".to_string()))
            .await
    }
}
