//! `upgrade machinepool`.

use super::Runtime;
use crate::gate::{self, Operation};
use crate::options::upgrade::{self as opts, UpgradeFlags};
use crate::upgrade::UpgradePlanner;

pub async fn upgrade(
    rt: &Runtime,
    key: &str,
    node_pool_id: &str,
    flags: &UpgradeFlags,
) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::NodePoolUpgrade)?;

    let rec = rt.reconciler();
    let planner = UpgradePlanner::new(rt.api.as_ref(), &rec, rt.yes);
    let scheduling = opts::reconcile(&rec, flags, planner.immediate())?;

    match planner.plan(&cluster, key, node_pool_id, &scheduling).await? {
        Some(policy) => {
            planner.submit(&cluster, key, &policy).await?;
        }
        None => {
            tracing::debug!(cluster = %key, node_pool = %node_pool_id, "nothing to schedule");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::api::fake::{hosted_cluster, node_pool, version, FakeApi};
    use crate::commands::testing::runtime;
    use crate::error::RosaError;
    use crate::model::{ClusterState, NodePoolUpgradePolicy, UpgradePolicyState, UpgradeStateValue};
    use crate::options::upgrade::{SCHEDULE_DATE_FLAG, SCHEDULE_TIME_FLAG, VERSION_FLAG};
    use crate::options::ChangedFlags;

    const CLUSTER_ID: &str = "24vf9iitg3p6tlml88iml6j6mu095mh8";

    fn world() -> FakeApi {
        FakeApi::new()
            .with_cluster(hosted_cluster())
            .with_node_pool(CLUSTER_ID, node_pool("np1", "4.12.23"))
            .with_versions(vec![version("4.12.24"), version("4.12.25"), version("4.12.26")])
    }

    fn christmas(version: &str) -> UpgradeFlags {
        UpgradeFlags {
            version: version.to_string(),
            schedule_date: "2099-12-25".to_string(),
            schedule_time: "10:00".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_not_ready_cluster() {
        let mut cluster = hosted_cluster();
        cluster.state = ClusterState::Error;
        let (rt, api, prompter) = runtime(FakeApi::new().with_cluster(cluster), &[]);

        let err = upgrade(&rt, "cluster1", "np1", &UpgradeFlags::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Cluster 'cluster1' is not yet ready"));
        assert_eq!(err.exit_code(), 1);
        assert!(prompter.asked().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_scheduled_upgrade_submitted() {
        let (rt, api, _) = runtime(world(), &[]);
        let rt = rt.with_flags(ChangedFlags::new([SCHEDULE_DATE_FLAG, SCHEDULE_TIME_FLAG]));

        upgrade(&rt, "cluster1", "np1", &christmas("")).await.unwrap();
        assert_eq!(api.calls(), vec!["schedule_upgrade:np1"]);
        assert_eq!(
            rt.reporter.output().stdout,
            "INFO: Upgrade successfully scheduled for the machine pool 'np1' on cluster 'cluster1'\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_version_not_submitted() {
        let (rt, api, _) = runtime(world(), &[]);
        let rt = rt.with_flags(ChangedFlags::new([
            VERSION_FLAG,
            SCHEDULE_DATE_FLAG,
            SCHEDULE_TIME_FLAG,
        ]));

        let err = upgrade(&rt, "cluster1", "np1", &christmas("4.13.26"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("4.12.26 4.12.25 4.12.24"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pending_upgrade_exits_cleanly() {
        let mut pending = NodePoolUpgradePolicy::manual(
            "np1",
            "4.12.25",
            Utc.with_ymd_and_hms(2023, 8, 7, 15, 22, 0).unwrap(),
        );
        pending.state = Some(UpgradePolicyState {
            value: UpgradeStateValue::Scheduled,
            description: String::new(),
        });
        let (rt, api, _) = runtime(world().with_policy(CLUSTER_ID, pending), &[]);
        let rt = rt.with_flags(ChangedFlags::new([SCHEDULE_DATE_FLAG, SCHEDULE_TIME_FLAG]));

        upgrade(&rt, "cluster1", "np1", &christmas("")).await.unwrap();
        assert_eq!(
            rt.reporter.output().stderr,
            "WARN: There is already a scheduled upgrade to version 4.12.25 on 2023-08-07 15:22 UTC\n"
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_flags_goes_interactive() {
        // Empty answers take the defaults: no cron, now, newest version.
        let (rt, api, prompter) = runtime(world(), &[]);

        upgrade(&rt, "cluster1", "np1", &UpgradeFlags::default())
            .await
            .unwrap();
        assert_eq!(
            prompter.asked(),
            vec!["schedule", "schedule-date", "schedule-time", "version"]
        );
        let stdout = rt.reporter.output().stdout;
        assert!(stdout.starts_with("INFO: Enabling interactive mode\n"));
        assert_eq!(api.calls(), vec!["schedule_upgrade:np1"]);
    }

    #[tokio::test]
    async fn test_only_time_prompts_for_date() {
        let (rt, _, prompter) = runtime(world(), &["", "2099-12-25"]);
        let rt = rt.with_flags(ChangedFlags::new([SCHEDULE_TIME_FLAG]));
        let flags = UpgradeFlags {
            schedule_time: "10:00".to_string(),
            ..Default::default()
        };

        upgrade(&rt, "cluster1", "np1", &flags).await.unwrap();
        let asked = prompter.asked();
        assert!(asked.contains(&"schedule-date".to_string()));
        assert!(!asked.contains(&"schedule-time".to_string()));
    }

    #[tokio::test]
    async fn test_missing_node_pool() {
        let (rt, api, _) = runtime(world(), &[]);
        let rt = rt.with_flags(ChangedFlags::new([SCHEDULE_DATE_FLAG, SCHEDULE_TIME_FLAG]));

        let result = upgrade(&rt, "cluster1", "np9", &christmas("")).await;
        assert!(matches!(result, Err(RosaError::NotFound(msg)) if msg.contains("'np9'") && msg.contains("'cluster1'")));
        assert!(api.calls().is_empty());
    }
}
