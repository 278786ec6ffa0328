//! Options for `create break-glass-credential`.

use std::time::Duration;

use super::validate::{self, parse_duration};
use super::{OptionSpec, Reconciler};
use crate::error::RosaError;

pub const USERNAME_FLAG: &str = "username";
pub const EXPIRATION_FLAG: &str = "expiration";

const OPTIONS: &[&str] = &[USERNAME_FLAG, EXPIRATION_FLAG];

/// Raw flag values.
#[derive(Debug, Clone, Default)]
pub struct BreakGlassFlags {
    pub username: String,
    pub expiration: String,
}

/// Resolved credential options. Empty username and zero expiration leave the
/// choice to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakGlassArgs {
    pub username: String,
    pub expiration: Duration,
}

/// Resolve break glass options.
///
/// With no flags and interactive mode off this returns `None`: the service
/// picks both the username and the lifetime.
pub fn reconcile(rec: &Reconciler<'_>, flags: &BreakGlassFlags) -> crate::Result<Option<BreakGlassArgs>> {
    if !rec.is_interactive() && !rec.flags.any(OPTIONS) {
        return Ok(None);
    }

    let username = rec.string(OptionSpec::new(USERNAME_FLAG, "Username"), &flags.username)?;
    let expiration = rec.string(
        OptionSpec::new(EXPIRATION_FLAG, "Expiration (10m to 24h, e.g. 1h30m)")
            .validator(validate::expiration),
        &flags.expiration,
    )?;

    let expiration = if expiration.trim().is_empty() {
        Duration::ZERO
    } else {
        parse_duration(&expiration).map_err(RosaError::Validation)?
    };

    Ok(Some(BreakGlassArgs {
        username,
        expiration,
    }))
}
