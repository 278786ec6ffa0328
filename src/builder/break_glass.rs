use chrono::{DateTime, Timelike, Utc};

use crate::error::RosaError;
use crate::model::BreakGlassCredentialRequest;
use crate::options::break_glass::BreakGlassArgs;
use crate::options::validate::check_expiration;

/// Credential request expiring `args.expiration` from now.
pub fn build_break_glass(args: &BreakGlassArgs) -> crate::Result<BreakGlassCredentialRequest> {
    build_break_glass_at(args, Utc::now())
}

/// Credential request expiring `args.expiration` after `now`, truncated to
/// whole seconds. A zero expiration is left to the service.
pub fn build_break_glass_at(
    args: &BreakGlassArgs,
    now: DateTime<Utc>,
) -> crate::Result<BreakGlassCredentialRequest> {
    let username = (!args.username.is_empty()).then(|| args.username.clone());

    if args.expiration.is_zero() {
        return Ok(BreakGlassCredentialRequest {
            username,
            expiration_timestamp: None,
        });
    }

    check_expiration(args.expiration).map_err(RosaError::Validation)?;
    let delta = chrono::Duration::from_std(args.expiration)
        .map_err(|e| RosaError::Validation(format!("invalid expiration: {}", e)))?;
    let expires = (now + delta)
        .with_nanosecond(0)
        .ok_or_else(|| RosaError::Validation("invalid expiration timestamp".to_string()))?;

    Ok(BreakGlassCredentialRequest {
        username,
        expiration_timestamp: Some(expires),
    })
}
