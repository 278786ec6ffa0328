//! `create|list|delete dns-domain`. DNS domains belong to the organization,
//! not to a cluster, so no cluster is loaded.

use super::Runtime;
use crate::builder::build_dns_domain;
use crate::error::RosaError;
use crate::model::ClusterArchitecture;
use crate::output::{self, DnsDomainList};

pub async fn create(rt: &Runtime, hosted_cp: bool) -> crate::Result<()> {
    let request = build_dns_domain(hosted_cp);
    let created = rt
        .api
        .create_dns_domain(&request)
        .await
        .map_err(|e| e.context("Failed to create DNS domain"))?;
    tracing::info!(domain = %created.id, arch = %created.cluster_arch, "dns domain created");
    if !rt.output.is_human() {
        return rt.render(&created, || Ok(String::new()));
    }
    rt.reporter
        .info(format!("DNS domain '{}' has been created.", created.id));
    rt.reporter.info(
        "To view all DNS domains, run 'rosa list dns-domains'",
    );
    Ok(())
}

/// List user-defined domains; `hosted_cp` keeps only hosted control plane
/// domains.
pub async fn list(rt: &Runtime, hosted_cp: bool) -> crate::Result<()> {
    let mut domains = rt.api.list_dns_domains().await?;
    if hosted_cp {
        domains.retain(|d| d.cluster_arch == ClusterArchitecture::Hcp);
    }
    if domains.is_empty() && rt.output.is_human() {
        rt.reporter.info("There are no DNS domains for your organization");
        return Ok(());
    }
    rt.render(&domains, || Ok(output::table(&DnsDomainList(&domains))))
}

pub async fn delete(rt: &Runtime, id: &str) -> crate::Result<()> {
    if id.is_empty() {
        return Err(RosaError::Validation(
            "Expected the DNS domain to delete".to_string(),
        ));
    }
    if !rt.confirm(&format!("delete DNS domain '{}'", id))? {
        return Ok(());
    }
    rt.api
        .delete_dns_domain(id)
        .await
        .map_err(|e| e.context(format!("Failed to delete DNS domain '{}'", id)))?;
    rt.reporter
        .info(format!("Successfully deleted DNS domain '{}'", id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::commands::testing::runtime;
    use crate::model::{DnsDomain, ObjectRef};

    fn domain(id: &str, arch: ClusterArchitecture) -> DnsDomain {
        DnsDomain {
            id: id.to_string(),
            cluster_arch: arch,
            user_defined: true,
            cluster: Some(ObjectRef {
                id: "2a3b4c".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_create_hosted_cp() {
        let (rt, api, _) = runtime(FakeApi::new(), &[]);

        create(&rt, true).await.unwrap();
        assert_eq!(api.calls(), vec!["create_dns_domain:hcp"]);
        assert!(rt.reporter.output().stdout.contains("has been created"));
    }

    #[tokio::test]
    async fn test_list_filters_hosted_cp() {
        let api = FakeApi::new()
            .with_dns_domain(domain("abc1.s1.devshift.org", ClusterArchitecture::Classic))
            .with_dns_domain(domain("def2.s1.devshift.org", ClusterArchitecture::Hcp));
        let (rt, _, _) = runtime(api, &[]);

        list(&rt, true).await.unwrap();
        let stdout = rt.reporter.output().stdout;
        assert!(stdout.lines().next().unwrap().contains("USER DEFINED"));
        assert!(stdout.contains("def2.s1.devshift.org"));
        assert!(!stdout.contains("abc1.s1.devshift.org"));
    }

    #[tokio::test]
    async fn test_delete_unknown_domain() {
        let (rt, _, _) = runtime(FakeApi::new(), &[]);
        let rt = rt.assume_yes(true);

        let result = delete(&rt, "nope.s1.devshift.org").await;
        assert!(matches!(result, Err(RosaError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation_off_terminal() {
        let api = FakeApi::new().with_dns_domain(domain("abc1.s1.devshift.org", ClusterArchitecture::Hcp));
        let (rt, api, _) = runtime(api, &[]);

        let result = delete(&rt, "abc1.s1.devshift.org").await;
        assert!(matches!(result, Err(RosaError::Validation(msg)) if msg.contains("'--yes'")));
        assert!(api.calls().is_empty());
    }
}
