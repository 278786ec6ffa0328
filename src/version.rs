//! OpenShift version identifiers.
//!
//! The API names versions `openshift-v<raw>[-<channel>]`. Everything inside
//! this crate compares the raw `x.y.z` form; ids are stripped once, here.

use std::cmp::Ordering;

use crate::error::RosaError;
use crate::model::Version;

pub const VERSION_PREFIX: &str = "openshift-v";

/// Strip the `openshift-v` prefix and any `-<channel>` suffix.
pub fn raw_id(version_id: &str) -> &str {
    let trimmed = version_id.strip_prefix(VERSION_PREFIX).unwrap_or(version_id);
    match trimmed.rsplit_once('-') {
        Some((raw, channel))
            if !raw.is_empty() && channel.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            raw
        }
        _ => trimmed,
    }
}

/// Order two raw versions. Semver when both parse, otherwise segment by
/// segment with numeric segments compared as numbers.
pub fn compare(a: &str, b: &str) -> Ordering {
    if let (Ok(va), Ok(vb)) = (semver::Version::parse(a), semver::Version::parse(b)) {
        return va.cmp(&vb);
    }
    let seg_a: Vec<&str> = a.split(['.', '-']).collect();
    let seg_b: Vec<&str> = b.split(['.', '-']).collect();
    for (x, y) in seg_a.iter().zip(seg_b.iter()) {
        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(nx), Ok(ny)) => nx.cmp(&ny),
            _ => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    seg_a.len().cmp(&seg_b.len())
}

fn raw_of(version: &Version) -> &str {
    if version.raw_id.is_empty() {
        raw_id(&version.id)
    } else {
        &version.raw_id
    }
}

/// Versions a node pool can move to: enabled for hosted control planes,
/// newer than the pool, not newer than the control plane. Newest first.
pub fn available_node_pool_upgrades(
    versions: &[Version],
    node_pool_raw: &str,
    cluster_raw: &str,
) -> Vec<String> {
    let mut available: Vec<String> = versions
        .iter()
        .filter(|v| v.enabled && v.hosted_control_plane_enabled)
        .map(raw_of)
        .filter(|raw| {
            compare(raw, node_pool_raw) == Ordering::Greater
                && compare(raw, cluster_raw) != Ordering::Greater
        })
        .map(str::to_string)
        .collect();
    available.sort_by(|a, b| compare(b, a));
    available.dedup();
    available
}

/// Check `target` against the available upgrades, returning its raw form.
pub fn validate_target(target: &str, available: &[String]) -> crate::Result<String> {
    let raw = raw_id(target.trim());
    if available.iter().any(|v| v == raw) {
        return Ok(raw.to_string());
    }
    Err(RosaError::UnknownVersion(
        "A valid version number must be specified".to_string(),
        available.join(" "),
    ))
}
