//! `create|edit|list|describe|delete tuning-config`.

use super::Runtime;
use crate::builder::build_tuning_config;
use crate::error::RosaError;
use crate::gate::{self, Operation};
use crate::model::{Cluster, TuningConfig};
use crate::options::tuning::{self as opts, TuningFlags};
use crate::output::{self, TuningConfigList};

/// Find a tuning config by name, falling back to its id.
async fn find(rt: &Runtime, cluster: &Cluster, key: &str, name: &str) -> crate::Result<TuningConfig> {
    if name.is_empty() {
        return Err(RosaError::Validation(
            "Expected exactly one command line parameter containing the name of the tuning config"
                .to_string(),
        ));
    }
    let configs = rt.api.list_tuning_configs(&cluster.id).await?;
    configs
        .into_iter()
        .find(|c| c.name == name || c.id == name)
        .ok_or_else(|| {
            RosaError::NotFound(format!(
                "Tuning config '{}' does not exist on cluster '{}'",
                name, key
            ))
        })
}

pub async fn create(rt: &Runtime, key: &str, flags: &TuningFlags) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::TuningConfig)?;

    let args = opts::reconcile_create(&rt.reconciler(), flags)?;
    let config = build_tuning_config(&args.name, &args.spec_path)?;

    rt.api
        .create_tuning_config(&cluster.id, &config)
        .await
        .map_err(|e| e.context(format!("Failed to add tuning config to cluster '{}'", key)))?;
    rt.reporter.info(format!(
        "Tuning config '{}' has been created on cluster '{}'.",
        args.name, key
    ));
    rt.reporter.info(format!(
        "To view all tuning configs, run 'rosa list tuning-configs -c {}'",
        key
    ));
    Ok(())
}

/// Replace the spec of the named config.
pub async fn edit(rt: &Runtime, key: &str, name: &str, flags: &TuningFlags) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::TuningConfig)?;

    let current = find(rt, &cluster, key, name).await?;
    let args = opts::reconcile_edit(&rt.reconciler(), &current.name, flags)?;
    let mut patch = build_tuning_config(&args.name, &args.spec_path)?;
    patch.id = current.id.clone();

    rt.api
        .update_tuning_config(&cluster.id, &patch)
        .await
        .map_err(|e| e.context(format!("Failed to update tuning config for cluster '{}'", key)))?;
    rt.reporter.info(format!(
        "Updated tuning config '{}' for cluster '{}'",
        current.name, key
    ));
    Ok(())
}

pub async fn list(rt: &Runtime, key: &str) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::TuningConfig)?;

    let configs = rt.api.list_tuning_configs(&cluster.id).await?;
    if configs.is_empty() && rt.output.is_human() {
        rt.reporter
            .info(format!("There are no tuning configs for cluster '{}'", key));
        return Ok(());
    }
    rt.render(&configs, || Ok(output::table(&TuningConfigList(&configs))))
}

pub async fn describe(rt: &Runtime, key: &str, name: &str) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::TuningConfig)?;

    let config = find(rt, &cluster, key, name).await?;
    rt.render(&config, || output::describe_tuning_config(&config))
}

pub async fn delete(rt: &Runtime, key: &str, name: &str) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::TuningConfig)?;

    let config = find(rt, &cluster, key, name).await?;
    if !rt.confirm(&format!(
        "delete tuning config '{}' on cluster '{}'",
        config.name, key
    ))? {
        return Ok(());
    }
    rt.api
        .delete_tuning_config(&cluster.id, &config.id)
        .await
        .map_err(|e| {
            e.context(format!(
                "Failed to delete tuning config '{}' on cluster '{}'",
                config.name, key
            ))
        })?;
    rt.reporter.info(format!(
        "Successfully deleted tuning config '{}' from cluster '{}'",
        config.name, key
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::api::fake::{hosted_cluster, FakeApi};
    use crate::commands::testing::runtime;
    use crate::options::tuning::{NAME_FLAG, SPEC_PATH_FLAG};
    use crate::options::ChangedFlags;

    const CLUSTER_ID: &str = "24vf9iitg3p6tlml88iml6j6mu095mh8";

    fn spec_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn existing() -> TuningConfig {
        TuningConfig {
            id: "tc-9".to_string(),
            name: "tuned1".to_string(),
            spec: json!({"profile": []}),
        }
    }

    #[tokio::test]
    async fn test_create_from_flags() {
        let spec = spec_file("profile:\n- name: tuned1\n  data: '[main]'\n");
        let (rt, api, prompter) = runtime(FakeApi::new().with_cluster(hosted_cluster()), &[]);
        let rt = rt.with_flags(ChangedFlags::new([NAME_FLAG, SPEC_PATH_FLAG]));
        let flags = TuningFlags {
            name: "tuned1".to_string(),
            spec_path: spec.path().to_str().unwrap().to_string(),
        };

        create(&rt, "cluster1", &flags).await.unwrap();
        assert_eq!(api.calls(), vec!["create_tuning_config:tuned1"]);
        assert!(prompter.asked().is_empty());
        assert!(rt
            .reporter
            .output()
            .stdout
            .starts_with("INFO: Tuning config 'tuned1' has been created on cluster 'cluster1'.\n"));
    }

    #[tokio::test]
    async fn test_create_without_flags_goes_interactive() {
        let spec = spec_file("{\"profile\": []}");
        let path = spec.path().to_str().unwrap().to_string();
        let (rt, api, prompter) =
            runtime(FakeApi::new().with_cluster(hosted_cluster()), &["tuned2", path.as_str()]);

        create(&rt, "cluster1", &TuningFlags::default()).await.unwrap();
        assert_eq!(prompter.asked(), vec!["name", "spec-path"]);
        assert!(rt.reporter.output().stdout.starts_with("INFO: Enabling interactive mode\n"));
        assert_eq!(api.calls(), vec!["create_tuning_config:tuned2"]);
    }

    #[tokio::test]
    async fn test_classic_cluster_rejected() {
        let mut cluster = hosted_cluster();
        cluster.hypershift.enabled = false;
        let (rt, api, _) = runtime(FakeApi::new().with_cluster(cluster), &[]);

        let result = list(&rt, "cluster1").await;
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Tuning config is only supported for Hosted Control Planes");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_replaces_spec() {
        let spec = spec_file("{\"profile\": [{\"name\": \"new\"}]}");
        let api = FakeApi::new()
            .with_cluster(hosted_cluster())
            .with_tuning_config(CLUSTER_ID, existing());
        let (rt, api, _) = runtime(api, &[]);
        let rt = rt.with_flags(ChangedFlags::new([SPEC_PATH_FLAG]));
        let flags = TuningFlags {
            spec_path: spec.path().to_str().unwrap().to_string(),
            ..Default::default()
        };

        edit(&rt, "cluster1", "tuned1", &flags).await.unwrap();
        assert_eq!(api.calls(), vec!["update_tuning_config:tc-9"]);
    }

    #[tokio::test]
    async fn test_edit_missing_config() {
        let (rt, api, _) = runtime(FakeApi::new().with_cluster(hosted_cluster()), &[]);

        let result = edit(&rt, "cluster1", "nope", &TuningFlags::default()).await;
        assert!(matches!(result, Err(RosaError::NotFound(msg)) if msg.contains("'nope'")));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_describe() {
        let api = FakeApi::new()
            .with_cluster(hosted_cluster())
            .with_tuning_config(CLUSTER_ID, existing());
        let (rt, _, _) = runtime(api, &[]);

        list(&rt, "cluster1").await.unwrap();
        describe(&rt, "cluster1", "tuned1").await.unwrap();
        let stdout = rt.reporter.output().stdout;
        assert!(stdout.lines().next().unwrap().contains("NAME"));
        assert!(stdout.contains("Name:                                  tuned1\n"));
        assert!(stdout.contains("ID:                                    tc-9\n"));
    }

    #[tokio::test]
    async fn test_delete_by_name() {
        let api = FakeApi::new()
            .with_cluster(hosted_cluster())
            .with_tuning_config(CLUSTER_ID, existing());
        let (rt, api, _) = runtime(api, &[]);
        let rt = rt.assume_yes(true);

        delete(&rt, "cluster1", "tuned1").await.unwrap();
        assert_eq!(api.calls(), vec!["delete_tuning_config:tc-9"]);
    }
}
