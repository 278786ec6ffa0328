//! Node pool upgrade planner.
//!
//! Produces at most one upgrade policy per node pool: either a one-shot
//! manual upgrade to a specific version, or a cron schedule under which the
//! service picks the latest version at each firing. A node pool that already
//! has an active policy is left alone.

use chrono::{DateTime, Duration, DurationRound, NaiveDate, NaiveTime, Utc};

use crate::api::ClusterApi;
use crate::error::RosaError;
use crate::gate::{self, Operation};
use crate::model::{Cluster, NodePool, NodePoolUpgradePolicy, ScheduleType};
use crate::options::upgrade::{UpgradeScheduling, VERSION_FLAG};
use crate::options::validate::{self, DATE_FORMAT, TIME_FORMAT};
use crate::options::{OptionSpec, Reconciler};
use crate::version;

/// How far a manual schedule may lag behind the current time.
pub const SCHEDULE_SKEW_SECS: i64 = 60;

/// Layout of next-run instants in diagnostics.
pub const NEXT_RUN_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

pub struct UpgradePlanner<'a> {
    api: &'a dyn ClusterApi,
    rec: &'a Reconciler<'a>,
    assume_yes: bool,
    now: DateTime<Utc>,
}

impl<'a> UpgradePlanner<'a> {
    pub fn new(api: &'a dyn ClusterApi, rec: &'a Reconciler<'a>, assume_yes: bool) -> Self {
        Self {
            api,
            rec,
            assume_yes,
            now: Utc::now(),
        }
    }

    /// Plan against a fixed clock.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Next-run instant for "upgrade now": the next whole minute.
    pub fn immediate(&self) -> DateTime<Utc> {
        let minute = Duration::minutes(1);
        match self.now.duration_trunc(minute) {
            Ok(truncated) => truncated + minute,
            Err(_) => self.now + minute,
        }
    }

    /// Compute the upgrade policy for `node_pool_id`.
    ///
    /// `Ok(None)` means there is nothing to submit: an upgrade is already
    /// pending, no newer version exists, or the user declined.
    pub async fn plan(
        &self,
        cluster: &Cluster,
        key: &str,
        node_pool_id: &str,
        scheduling: &UpgradeScheduling,
    ) -> crate::Result<Option<NodePoolUpgradePolicy>> {
        scheduling.check()?;
        gate::admits(cluster, key, Operation::NodePoolUpgrade)?;
        validate::node_pool_id(node_pool_id).map_err(RosaError::Validation)?;

        let missing = || {
            RosaError::NotFound(format!(
                "Failed to get scheduled upgrades for machine pool '{0}': Machine pool '{0}' \
                 does not exist for hosted cluster '{1}'",
                node_pool_id, key
            ))
        };
        let node_pool = match self.api.get_node_pool(&cluster.id, node_pool_id).await {
            Ok(Some(pool)) => pool,
            Ok(None) | Err(RosaError::NotFound(_)) => return Err(missing()),
            Err(e) => return Err(e),
        };

        let existing = self
            .api
            .list_node_pool_upgrade_policies(&cluster.id, node_pool_id)
            .await?;
        if let Some(pending) = existing.iter().find(|p| p.is_active()) {
            self.rec.reporter.warn(describe_pending(pending));
            return Ok(None);
        }

        if scheduling.automatic_upgrades() {
            self.plan_automatic(node_pool_id, scheduling)
        } else {
            self.plan_manual(cluster, key, &node_pool, scheduling).await
        }
    }

    async fn plan_manual(
        &self,
        cluster: &Cluster,
        key: &str,
        node_pool: &NodePool,
        scheduling: &UpgradeScheduling,
    ) -> crate::Result<Option<NodePoolUpgradePolicy>> {
        let next_run = self.next_run(scheduling)?;

        let versions = self.api.list_versions(cluster.channel_group()).await?;
        let cluster_raw = raw_of(&cluster.version.raw_id, &cluster.version.id);
        let pool_raw = raw_of(&node_pool.version.raw_id, &node_pool.version.id);
        let available = version::available_node_pool_upgrades(&versions, pool_raw, cluster_raw);
        tracing::debug!(
            node_pool = %node_pool.id,
            current = %pool_raw,
            available = ?available,
            "computed available node pool upgrades"
        );

        if available.is_empty() {
            self.rec.reporter.info(format!(
                "No upgrade available for the machine pool '{}' on cluster '{}'",
                node_pool.id, key
            ));
            return Ok(None);
        }

        let target = if scheduling.target_version.is_empty() {
            self.rec.choose(
                OptionSpec::new(VERSION_FLAG, "Version").default(&available[0]),
                "",
                &available,
            )?
        } else {
            scheduling.target_version.clone()
        };
        let target = version::validate_target(&target, &available)?;

        if !self.confirm(&format!(
            "upgrade machine pool '{}' to version '{}'",
            node_pool.id, target
        ))? {
            return Ok(None);
        }

        Ok(Some(NodePoolUpgradePolicy::manual(
            &node_pool.id,
            &target,
            next_run,
        )))
    }

    fn plan_automatic(
        &self,
        node_pool_id: &str,
        scheduling: &UpgradeScheduling,
    ) -> crate::Result<Option<NodePoolUpgradePolicy>> {
        let schedule = crate::cron::normalize(&scheduling.schedule)?;
        if !self.confirm(&format!(
            "upgrade machine pool '{}' on schedule '{}'",
            node_pool_id, schedule
        ))? {
            return Ok(None);
        }
        Ok(Some(NodePoolUpgradePolicy::automatic(
            node_pool_id,
            &schedule,
            scheduling.allow_minor_version_updates,
        )))
    }

    fn next_run(&self, scheduling: &UpgradeScheduling) -> crate::Result<DateTime<Utc>> {
        if scheduling.schedule_date.is_empty() && scheduling.schedule_time.is_empty() {
            return Ok(self.immediate());
        }
        let date = NaiveDate::parse_from_str(scheduling.schedule_date.trim(), DATE_FORMAT)
            .map_err(|_| {
                RosaError::Validation("schedule date should use the format 'yyyy-mm-dd'".to_string())
            })?;
        let time = NaiveTime::parse_from_str(scheduling.schedule_time.trim(), TIME_FORMAT)
            .map_err(|_| {
                RosaError::Validation("schedule time should use the format 'HH:mm'".to_string())
            })?;
        let next_run = date.and_time(time).and_utc();
        if next_run < self.now - Duration::seconds(SCHEDULE_SKEW_SECS) {
            return Err(RosaError::ScheduleInPast(format!(
                "{} {}",
                scheduling.schedule_date, scheduling.schedule_time
            )));
        }
        Ok(next_run)
    }

    /// Ask before submitting, only when someone can answer.
    fn confirm(&self, action: &str) -> crate::Result<bool> {
        if self.assume_yes || !self.rec.reporter.is_terminal() {
            return Ok(true);
        }
        self.rec
            .prompter
            .confirm(&format!("Are you sure you want to {}?", action), true)
    }

    /// Submit a planned policy and report the outcome.
    pub async fn submit(
        &self,
        cluster: &Cluster,
        key: &str,
        policy: &NodePoolUpgradePolicy,
    ) -> crate::Result<NodePoolUpgradePolicy> {
        let created = self
            .api
            .schedule_node_pool_upgrade(&cluster.id, &policy.node_pool_id, policy)
            .await
            .map_err(|e| {
                e.context(format!(
                    "Failed to schedule upgrade for machine pool {} in cluster '{}'",
                    policy.node_pool_id, key
                ))
            })?;
        tracing::info!(
            cluster = %key,
            node_pool = %policy.node_pool_id,
            schedule_type = %policy.schedule_type,
            "node pool upgrade scheduled"
        );
        self.rec.reporter.info(format!(
            "Upgrade successfully scheduled for the machine pool '{}' on cluster '{}'",
            policy.node_pool_id, key
        ));
        Ok(created)
    }
}

fn raw_of<'v>(raw_id: &'v str, id: &'v str) -> &'v str {
    if raw_id.is_empty() {
        version::raw_id(id)
    } else {
        raw_id
    }
}

/// The one-line notice for an upgrade that is already pending.
pub fn describe_pending(policy: &NodePoolUpgradePolicy) -> String {
    let state = policy
        .state
        .as_ref()
        .map(|s| s.value.to_string())
        .unwrap_or_else(|| "pending".to_string());
    let next_run = policy
        .next_run
        .map(|t| t.format(NEXT_RUN_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string());
    match policy.schedule_type {
        ScheduleType::Manual => format!(
            "There is already a {} upgrade to version {} on {}",
            state, policy.version, next_run
        ),
        ScheduleType::Automatic => format!(
            "There is already a {} automatic upgrade with schedule '{}', next run on {}",
            state, policy.schedule, next_run
        ),
    }
}
