//! Validators shared by flags and prompts.
//!
//! Each returns the message to show the user; the reconciler decides whether
//! that means re-prompting or failing the command.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

/// Shortest break glass credential lifetime the service issues.
pub const MIN_EXPIRATION: Duration = Duration::from_secs(10 * 60);

/// Longest break glass credential lifetime the service issues.
pub const MAX_EXPIRATION: Duration = Duration::from_secs(24 * 60 * 60);

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// A validator takes the raw answer and returns an error message.
pub type Validator = fn(&str) -> Result<(), String>;

static NODE_POOL_ID: OnceLock<Regex> = OnceLock::new();

fn node_pool_id_regex() -> &'static Regex {
    NODE_POOL_ID.get_or_init(|| Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"))
}

pub fn node_pool_id(value: &str) -> Result<(), String> {
    if node_pool_id_regex().is_match(value) {
        Ok(())
    } else {
        Err(format!(
            "Expected a valid identifier for the machine pool: '{}'. It must consist of \
             lower-case alphanumeric characters or '-', start with a letter, and end with \
             an alphanumeric character",
            value
        ))
    }
}

pub fn url(value: &str) -> Result<(), String> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(())
        }
        Ok(_) => Err(format!("'{}' must be an http or https URL", value)),
        Err(e) => Err(format!("'{}' is not a valid URL: {}", value, e)),
    }
}

/// Parse a duration such as `1h30m` or `90s`.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value.trim())
        .map_err(|e| format!("'{}' is not a valid duration: {}", value, e))
}

/// Break glass lifetime. Empty or zero means "let the service decide".
pub fn expiration(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Ok(());
    }
    let d = parse_duration(value)?;
    if d.is_zero() {
        return Ok(());
    }
    check_expiration(d)
}

pub fn check_expiration(d: Duration) -> Result<(), String> {
    if d < MIN_EXPIRATION || d > MAX_EXPIRATION {
        return Err(format!(
            "expiration must be between 10m and 24h, got '{}'",
            humantime::format_duration(d)
        ));
    }
    Ok(())
}

pub fn cron(value: &str) -> Result<(), String> {
    crate::cron::normalize(value)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Split a `<claim>:<required_value>` rule. `None` when either half is empty.
pub fn split_claim_rule(rule: &str) -> Option<(&str, &str)> {
    let (claim, required) = rule.split_once(':')?;
    let claim = claim.trim();
    let required = required.trim();
    if claim.is_empty() || required.is_empty() {
        return None;
    }
    Some((claim, required))
}

pub fn claim_rule(rule: &str) -> Result<(), String> {
    if split_claim_rule(rule).is_none() {
        return Err(format!(
            "invalid identifier '{}' for 'claim validation rule. 'Should be in a \
             <claim>:<required_value> format.",
            rule
        ));
    }
    Ok(())
}

pub fn schedule_date(value: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| "schedule date should use the format 'yyyy-mm-dd'".to_string())
}

pub fn schedule_time(value: &str) -> Result<(), String> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map(|_| ())
        .map_err(|_| "schedule time should use the format 'HH:mm'".to_string())
}

/// A local file that must exist when named. Empty means "not given".
pub fn optional_file(value: &str) -> Result<(), String> {
    if value.is_empty() || Path::new(value).is_file() {
        Ok(())
    } else {
        Err(format!("file '{}' does not exist", value))
    }
}

pub fn required_file(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("a file path is required".to_string());
    }
    optional_file(value)
}

/// Split a comma-separated list, dropping empty fragments.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
