//! Break glass credential lifecycle: create, wait for the kubeconfig,
//! describe, list and revoke.
//!
//! The kubeconfig poll is the only long-running operation. It moves between
//! polling and waiting until the credential is issued, the deadline passes
//! or the caller cancels.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::ClusterApi;
use crate::error::RosaError;
use crate::model::{BreakGlassCredential, BreakGlassCredentialRequest, BreakGlassStatus};

/// Default wait between kubeconfig reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default overall kubeconfig deadline.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Submit a new credential and return what the service assigned.
pub async fn create(
    api: &dyn ClusterApi,
    cluster_id: &str,
    key: &str,
    request: &BreakGlassCredentialRequest,
) -> crate::Result<BreakGlassCredential> {
    let created = api
        .create_break_glass_credential(cluster_id, request)
        .await
        .map_err(|e| {
            e.context(format!(
                "Failed to create a break glass credential for cluster '{}'",
                key
            ))
        })?;
    tracing::info!(cluster = %key, credential = %created.id, "break glass credential created");
    Ok(created)
}

/// Fetch one credential. A revoked credential is reported as
/// [`RosaError::Revoked`].
pub async fn describe(
    api: &dyn ClusterApi,
    cluster_id: &str,
    key: &str,
    credential_id: &str,
) -> crate::Result<BreakGlassCredential> {
    let credential = api
        .get_break_glass_credential(cluster_id, credential_id)
        .await
        .map_err(|e| match e {
            RosaError::NotFound(_) => RosaError::NotFound(format!(
                "Break glass credential '{}' does not exist for cluster '{}'",
                credential_id, key
            )),
            other => other,
        })?;
    if credential.status == BreakGlassStatus::Revoked {
        return Err(RosaError::Revoked(credential.id, key.to_string()));
    }
    Ok(credential)
}

pub async fn list(
    api: &dyn ClusterApi,
    cluster_id: &str,
    key: &str,
) -> crate::Result<Vec<BreakGlassCredential>> {
    api.list_break_glass_credentials(cluster_id)
        .await
        .map_err(|e| {
            e.context(format!(
                "Failed to list break glass credentials for cluster '{}'",
                key
            ))
        })
}

/// Revoke every credential of the cluster. Revoking already revoked
/// credentials succeeds.
pub async fn revoke_all(api: &dyn ClusterApi, cluster_id: &str, key: &str) -> crate::Result<()> {
    api.revoke_break_glass_credentials(cluster_id)
        .await
        .map_err(|e| {
            e.context(format!(
                "Failed to revoke break glass credentials for cluster '{}'",
                key
            ))
        })?;
    tracing::info!(cluster = %key, "break glass credentials revoked");
    Ok(())
}

/// Outcome of a single credential read.
enum Step {
    Done(String),
    Waiting,
}

/// Poll settings for the kubeconfig wait.
#[derive(Debug, Clone, Copy)]
pub struct KubeconfigPoller {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for KubeconfigPoller {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl KubeconfigPoller {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Read the credential until it is issued with a kubeconfig.
    ///
    /// Transient read failures are retried until the deadline. Cancelling
    /// `cancel` stops the wait at once, including an in-flight read.
    pub async fn poll(
        &self,
        api: &dyn ClusterApi,
        cluster_id: &str,
        key: &str,
        credential_id: &str,
        cancel: &CancellationToken,
    ) -> crate::Result<String> {
        let deadline = Instant::now() + self.timeout;
        let timed_out = || {
            RosaError::Timeout(format!(
                "Failed to poll kubeconfig for cluster '{}' with break glass credential '{}': timed out",
                key, credential_id
            ))
        };

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RosaError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => return Err(timed_out()),
                response = api.get_break_glass_credential(cluster_id, credential_id) => response,
            };

            match self.step(response, key, credential_id)? {
                Step::Done(kubeconfig) => {
                    tracing::debug!(cluster = %key, credential = %credential_id, attempt, "kubeconfig issued");
                    return Ok(kubeconfig);
                }
                Step::Waiting => {
                    tracing::debug!(cluster = %key, credential = %credential_id, attempt, "kubeconfig not ready");
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RosaError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => return Err(timed_out()),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    fn step(
        &self,
        response: crate::Result<BreakGlassCredential>,
        key: &str,
        credential_id: &str,
    ) -> crate::Result<Step> {
        let credential = match response {
            Ok(credential) => credential,
            Err(e) if e.is_transient() => {
                tracing::warn!(cluster = %key, credential = %credential_id, error = %e, "retrying credential read");
                return Ok(Step::Waiting);
            }
            Err(e) => return Err(e),
        };

        match credential.status {
            BreakGlassStatus::Issued if !credential.kubeconfig.is_empty() => {
                Ok(Step::Done(credential.kubeconfig))
            }
            BreakGlassStatus::Revoked => {
                Err(RosaError::Revoked(credential_id.to_string(), key.to_string()))
            }
            BreakGlassStatus::Failed | BreakGlassStatus::Expired => Err(RosaError::Remote(format!(
                "Break glass credential '{}' for cluster '{}' is {}",
                credential_id, key, credential.status
            ))),
            _ => Ok(Step::Waiting),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{credential, hosted_cluster, FakeApi};

    const CLUSTER_ID: &str = "24vf9iitg3p6tlml88iml6j6mu095mh8";

    fn poller() -> KubeconfigPoller {
        KubeconfigPoller::new(Duration::from_secs(5), Duration::from_secs(60))
    }

    fn api_with(status: BreakGlassStatus, kubeconfig: &str) -> FakeApi {
        FakeApi::new()
            .with_cluster(hosted_cluster())
            .with_credential(CLUSTER_ID, credential("bgc-1", status, kubeconfig))
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_issued() {
        let api = api_with(BreakGlassStatus::Created, "");
        api.script_credential_reads(vec![
            Ok(credential("bgc-1", BreakGlassStatus::Created, "")),
            Ok(credential("bgc-1", BreakGlassStatus::Issued, "")),
            Ok(credential("bgc-1", BreakGlassStatus::Issued, "apiVersion: v1\n")),
        ]);

        let kubeconfig = poller()
            .poll(&api, CLUSTER_ID, "cluster1", "bgc-1", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(kubeconfig, "apiVersion: v1\n");
        assert_eq!(api.credential_reads(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_retried() {
        let api = api_with(BreakGlassStatus::Issued, "apiVersion: v1\n");
        api.script_credential_reads(vec![
            Err(RosaError::Transient("status 503".to_string())),
            Err(RosaError::Transient("connection reset".to_string())),
        ]);

        let kubeconfig = poller()
            .poll(&api, CLUSTER_ID, "cluster1", "bgc-1", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(kubeconfig, "apiVersion: v1\n");
        assert_eq!(api.credential_reads(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_error_not_retried() {
        let api = api_with(BreakGlassStatus::Created, "");
        api.script_credential_reads(vec![Err(RosaError::Remote("forbidden".to_string()))]);

        let result = poller()
            .poll(&api, CLUSTER_ID, "cluster1", "bgc-1", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(RosaError::Remote(msg)) if msg == "forbidden"));
        assert_eq!(api.credential_reads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoked_while_polling() {
        let api = api_with(BreakGlassStatus::Revoked, "");

        let result = poller()
            .poll(&api, CLUSTER_ID, "cluster1", "bgc-1", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(RosaError::Revoked(id, key)) if id == "bgc-1" && key == "cluster1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_credential() {
        let api = api_with(BreakGlassStatus::Failed, "");

        let result = poller()
            .poll(&api, CLUSTER_ID, "cluster1", "bgc-1", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(RosaError::Remote(msg)) if msg.contains("is failed")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let api = api_with(BreakGlassStatus::Created, "");

        let result = KubeconfigPoller::new(Duration::from_secs(5), Duration::from_secs(12))
            .poll(&api, CLUSTER_ID, "cluster1", "bgc-1", &CancellationToken::new())
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, RosaError::Timeout(_)));
        assert_eq!(
            err.to_string(),
            "Failed to poll kubeconfig for cluster 'cluster1' with break glass credential 'bgc-1': timed out"
        );
        // Reads at 0s, 5s and 10s.
        assert_eq!(api.credential_reads(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_read() {
        let api = api_with(BreakGlassStatus::Issued, "apiVersion: v1\n");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = poller().poll(&api, CLUSTER_ID, "cluster1", "bgc-1", &cancel).await;
        assert!(matches!(result, Err(RosaError::Cancelled)));
        assert_eq!(api.credential_reads(), 0);
        assert_eq!(RosaError::Cancelled.exit_code(), crate::error::EXIT_CANCELLED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_waiting() {
        let api = api_with(BreakGlassStatus::Created, "");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result = poller().poll(&api, CLUSTER_ID, "cluster1", "bgc-1", &cancel).await;
        assert!(matches!(result, Err(RosaError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(api.credential_reads(), 2);
    }

    #[tokio::test]
    async fn test_describe_revoked() {
        let api = api_with(BreakGlassStatus::Revoked, "");

        let result = describe(&api, CLUSTER_ID, "cluster1", "bgc-1").await;
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Break glass credential 'bgc-1' for cluster 'cluster1' has been revoked."
        );
    }

    #[tokio::test]
    async fn test_describe_missing() {
        let api = api_with(BreakGlassStatus::Issued, "");

        let result = describe(&api, CLUSTER_ID, "cluster1", "nope").await;
        assert!(matches!(result, Err(RosaError::NotFound(msg)) if msg.contains("'nope'") && msg.contains("'cluster1'")));
    }

    #[tokio::test]
    async fn test_revoke_all_twice() {
        let api = api_with(BreakGlassStatus::Issued, "apiVersion: v1\n");

        revoke_all(&api, CLUSTER_ID, "cluster1").await.unwrap();
        revoke_all(&api, CLUSTER_ID, "cluster1").await.unwrap();

        let creds = list(&api, CLUSTER_ID, "cluster1").await.unwrap();
        assert!(creds.iter().all(|c| c.status == BreakGlassStatus::Revoked));
        assert_eq!(api.calls(), vec!["revoke_break_glass", "revoke_break_glass"]);
    }

    #[tokio::test]
    async fn test_create_returns_assigned_id() {
        let api = FakeApi::new().with_cluster(hosted_cluster());
        let request = BreakGlassCredentialRequest {
            username: Some("admin".to_string()),
            expiration_timestamp: None,
        };

        let created = create(&api, CLUSTER_ID, "cluster1", &request).await.unwrap();
        assert_eq!(created.id, "bgc-1");
        assert_eq!(created.username, "admin");
        assert_eq!(api.calls(), vec!["create_break_glass"]);
    }
}
