//! Options for `create`/`edit tuning-config`.

use super::validate;
use super::{OptionSpec, Reconciler};

pub const NAME_FLAG: &str = "name";
pub const SPEC_PATH_FLAG: &str = "spec-path";

#[derive(Debug, Clone, Default)]
pub struct TuningFlags {
    pub name: String,
    pub spec_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningArgs {
    pub name: String,
    pub spec_path: String,
}

/// Resolve options for a new tuning config. Both are mandatory.
pub fn reconcile_create(rec: &Reconciler<'_>, flags: &TuningFlags) -> crate::Result<TuningArgs> {
    rec.enable_interactive_if_none_given(&[NAME_FLAG, SPEC_PATH_FLAG]);

    let name = rec.string(OptionSpec::new(NAME_FLAG, "Name").required(), &flags.name)?;
    let spec_path = rec.string(
        OptionSpec::new(SPEC_PATH_FLAG, "Path to the TuneD spec file (JSON or YAML)")
            .required()
            .validator(validate::required_file),
        &flags.spec_path,
    )?;
    Ok(TuningArgs { name, spec_path })
}

/// Resolve options for editing the config named on the command line.
pub fn reconcile_edit(
    rec: &Reconciler<'_>,
    name: &str,
    flags: &TuningFlags,
) -> crate::Result<TuningArgs> {
    rec.enable_interactive_if_none_given(&[SPEC_PATH_FLAG]);

    let spec_path = rec.string(
        OptionSpec::new(SPEC_PATH_FLAG, "Path to the TuneD spec file (JSON or YAML)")
            .required()
            .validator(validate::required_file),
        &flags.spec_path,
    )?;
    Ok(TuningArgs {
        name: name.to_string(),
        spec_path,
    })
}
