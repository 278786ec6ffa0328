//! Options for `upgrade machinepool`.

use chrono::{DateTime, Utc};

use super::validate::{self, DATE_FORMAT, TIME_FORMAT};
use super::{OptionSpec, Reconciler};
use crate::error::RosaError;

pub const VERSION_FLAG: &str = "version";
pub const SCHEDULE_DATE_FLAG: &str = "schedule-date";
pub const SCHEDULE_TIME_FLAG: &str = "schedule-time";
pub const SCHEDULE_FLAG: &str = "schedule";
pub const ALLOW_MINOR_FLAG: &str = "allow-minor-version-upgrades";

const OPTIONS: &[&str] = &[
    VERSION_FLAG,
    SCHEDULE_DATE_FLAG,
    SCHEDULE_TIME_FLAG,
    SCHEDULE_FLAG,
    ALLOW_MINOR_FLAG,
];

#[derive(Debug, Clone, Default)]
pub struct UpgradeFlags {
    pub version: String,
    pub schedule_date: String,
    pub schedule_time: String,
    pub schedule: String,
    pub allow_minor_version_upgrades: bool,
}

fn unpaired_schedule() -> RosaError {
    RosaError::Validation(
        "The '--schedule-date' and '--schedule-time' options must be used together".to_string(),
    )
}

/// How and when a node pool should be upgraded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeScheduling {
    /// Cron expression, UTC.
    pub schedule: String,
    pub schedule_date: String,
    pub schedule_time: String,
    pub allow_minor_version_updates: bool,
    pub target_version: String,
}

impl UpgradeScheduling {
    /// Recurring upgrades on a cron schedule.
    pub fn automatic_upgrades(&self) -> bool {
        !self.schedule.is_empty()
    }

    /// Check the scheduling-mode invariants.
    pub fn check(&self) -> crate::Result<()> {
        let has_date = !self.schedule_date.is_empty();
        let has_time = !self.schedule_time.is_empty();
        if self.automatic_upgrades() && (has_date || has_time) {
            return Err(RosaError::Validation(
                "The '--schedule-date' and '--schedule-time' options are mutually exclusive \
                 with '--schedule'"
                    .to_string(),
            ));
        }
        if has_date != has_time {
            return Err(unpaired_schedule());
        }
        if self.allow_minor_version_updates && !self.automatic_upgrades() {
            return Err(RosaError::Validation(
                "The '--allow-minor-version-upgrades' option needs to be used with --schedule"
                    .to_string(),
            ));
        }
        if self.automatic_upgrades() && !self.target_version.is_empty() {
            return Err(RosaError::Validation(
                "The '--schedule' option is mutually exclusive with '--version'".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve upgrade options.
///
/// `immediate` is the next-run instant used when no date/time is given; in
/// interactive mode it pre-fills the date and time prompts.
pub fn reconcile(
    rec: &Reconciler<'_>,
    flags: &UpgradeFlags,
    immediate: DateTime<Utc>,
) -> crate::Result<UpgradeScheduling> {
    let given = UpgradeScheduling {
        schedule: flags.schedule.clone(),
        schedule_date: flags.schedule_date.clone(),
        schedule_time: flags.schedule_time.clone(),
        allow_minor_version_updates: flags.allow_minor_version_upgrades,
        target_version: flags.version.clone(),
    };
    // Only the pairing rule may be repaired, and only by asking someone.
    if let Err(e) = given.check() {
        let pairing_only = given.schedule.is_empty() && !given.allow_minor_version_updates;
        if !pairing_only || !rec.can_prompt() {
            return Err(e);
        }
    }

    if rec.flags.changed(SCHEDULE_DATE_FLAG) != rec.flags.changed(SCHEDULE_TIME_FLAG) {
        if !rec.can_prompt() {
            return Err(unpaired_schedule());
        }
        rec.force_interactive();
    } else {
        rec.enable_interactive_if_none_given(OPTIONS);
    }

    let schedule = rec.string(
        OptionSpec::new(SCHEDULE_FLAG, "Cron schedule (leave empty for a one-time upgrade)")
            .validator(validate::cron),
        &flags.schedule,
    )?;
    if !schedule.is_empty() {
        let schedule = crate::cron::normalize(&schedule)?;
        let allow_minor = rec.boolean(
            OptionSpec::new(ALLOW_MINOR_FLAG, "Enable minor version upgrades"),
            flags.allow_minor_version_upgrades,
            false,
        )?;
        let scheduling = UpgradeScheduling {
            schedule,
            allow_minor_version_updates: allow_minor,
            ..Default::default()
        };
        scheduling.check()?;
        return Ok(scheduling);
    }

    let (date_default, time_default) = if rec.is_interactive() {
        (
            immediate.format(DATE_FORMAT).to_string(),
            immediate.format(TIME_FORMAT).to_string(),
        )
    } else {
        (String::new(), String::new())
    };

    let schedule_date = rec.string(
        OptionSpec::new(SCHEDULE_DATE_FLAG, "Schedule date (yyyy-mm-dd, UTC)")
            .default(&date_default)
            .validator(validate::schedule_date),
        &flags.schedule_date,
    )?;
    let schedule_time = rec.string(
        OptionSpec::new(SCHEDULE_TIME_FLAG, "Schedule time (HH:mm, UTC)")
            .default(&time_default)
            .validator(validate::schedule_time),
        &flags.schedule_time,
    )?;

    let scheduling = UpgradeScheduling {
        schedule: String::new(),
        schedule_date,
        schedule_time,
        allow_minor_version_updates: false,
        target_version: flags.version.clone(),
    };
    scheduling.check()?;
    Ok(scheduling)
}
