//! Options for `create`/`edit external-auth-provider`.

use super::validate;
use super::{OptionSpec, Reconciler};
use crate::error::RosaError;

pub const NAME_FLAG: &str = "name";
pub const ISSUER_URL_FLAG: &str = "issuer-url";
pub const ISSUER_AUDIENCES_FLAG: &str = "issuer-audiences";
pub const ISSUER_CA_FILE_FLAG: &str = "issuer-ca-file";
pub const GROUPS_CLAIM_FLAG: &str = "claim-mapping-groups-claim";
pub const USERNAME_CLAIM_FLAG: &str = "claim-mapping-username-claim";
pub const VALIDATION_RULE_FLAG: &str = "claim-validation-rule";
pub const CONSOLE_CLIENT_ID_FLAG: &str = "console-client-id";
pub const CONSOLE_CLIENT_SECRET_FLAG: &str = "console-client-secret";

pub const DEFAULT_GROUPS_CLAIM: &str = "groups";
pub const DEFAULT_USERNAME_CLAIM: &str = "email";

const OPTIONS: &[&str] = &[
    NAME_FLAG,
    ISSUER_URL_FLAG,
    ISSUER_AUDIENCES_FLAG,
    ISSUER_CA_FILE_FLAG,
    GROUPS_CLAIM_FLAG,
    USERNAME_CLAIM_FLAG,
    VALIDATION_RULE_FLAG,
    CONSOLE_CLIENT_ID_FLAG,
    CONSOLE_CLIENT_SECRET_FLAG,
];

/// Raw flag values. List flags may hold comma-joined fragments.
#[derive(Debug, Clone, Default)]
pub struct ExternalAuthFlags {
    pub name: String,
    pub issuer_url: String,
    pub issuer_audiences: Vec<String>,
    pub issuer_ca_file: String,
    pub groups_claim: String,
    pub username_claim: String,
    pub claim_validation_rules: Vec<String>,
    pub console_client_id: String,
    pub console_client_secret: String,
}

/// Resolved provider options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAuthArgs {
    pub name: String,
    pub issuer_url: String,
    pub issuer_audiences: Vec<String>,
    pub issuer_ca_file: String,
    pub groups_claim: String,
    pub username_claim: String,
    pub claim_validation_rules: Vec<String>,
    pub console_client_id: String,
    pub console_client_secret: String,
}

impl Default for ExternalAuthArgs {
    fn default() -> Self {
        Self {
            name: String::new(),
            issuer_url: String::new(),
            issuer_audiences: Vec::new(),
            issuer_ca_file: String::new(),
            groups_claim: DEFAULT_GROUPS_CLAIM.to_string(),
            username_claim: DEFAULT_USERNAME_CLAIM.to_string(),
            claim_validation_rules: Vec::new(),
            console_client_id: String::new(),
            console_client_secret: String::new(),
        }
    }
}

impl ExternalAuthArgs {
    /// Name, issuer URL and at least one audience are always needed.
    pub fn check_mandatory(&self) -> crate::Result<()> {
        if self.name.is_empty() || self.issuer_url.is_empty() || self.issuer_audiences.is_empty() {
            return Err(RosaError::Validation(
                "'--name', '--issuer-url' and '--issuer-audiences' parameters are mandatory for \
                 creating an external authentication configuration"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve provider options against `current` (defaults for create, the
/// existing provider for edit).
///
/// The name is only asked for when `current` has none.
pub fn reconcile(
    rec: &Reconciler<'_>,
    flags: &ExternalAuthFlags,
    current: &ExternalAuthArgs,
) -> crate::Result<ExternalAuthArgs> {
    let considered: Vec<&str> = OPTIONS
        .iter()
        .copied()
        .filter(|f| *f != NAME_FLAG || current.name.is_empty())
        .collect();
    rec.enable_interactive_if_none_given(&considered);

    let name = if current.name.is_empty() {
        rec.string(OptionSpec::new(NAME_FLAG, "Name").required(), &flags.name)?
    } else {
        current.name.clone()
    };

    let issuer_url = rec.string(
        OptionSpec::new(ISSUER_URL_FLAG, "Issuer URL")
            .default(&current.issuer_url)
            .required()
            .validator(validate::url),
        &flags.issuer_url,
    )?;

    let audiences_default = current.issuer_audiences.join(",");
    let issuer_audiences = rec.list(
        OptionSpec::new(ISSUER_AUDIENCES_FLAG, "Issuer audiences (comma-separated)")
            .default(&audiences_default)
            .required(),
        &flags.issuer_audiences,
    )?;

    let issuer_ca_file = rec.string(
        OptionSpec::new(ISSUER_CA_FILE_FLAG, "Issuer CA file path")
            .default(&current.issuer_ca_file)
            .validator(validate::optional_file),
        &flags.issuer_ca_file,
    )?;

    let groups_claim = rec.string(
        OptionSpec::new(GROUPS_CLAIM_FLAG, "Groups claim").default(&current.groups_claim),
        &flags.groups_claim,
    )?;

    let username_claim = rec.string(
        OptionSpec::new(USERNAME_CLAIM_FLAG, "Username claim").default(&current.username_claim),
        &flags.username_claim,
    )?;

    let rules_default = current.claim_validation_rules.join(",");
    let claim_validation_rules = rec.list(
        OptionSpec::new(VALIDATION_RULE_FLAG, "Claim validation rules (<claim>:<value>, comma-separated)")
            .default(&rules_default)
            .validator(validate::claim_rule),
        &flags.claim_validation_rules,
    )?;

    let console_client_id = rec.string(
        OptionSpec::new(CONSOLE_CLIENT_ID_FLAG, "Console client ID")
            .default(&current.console_client_id),
        &flags.console_client_id,
    )?;

    let console_client_secret = if console_client_id.is_empty() {
        String::new()
    } else {
        rec.secret(
            OptionSpec::new(CONSOLE_CLIENT_SECRET_FLAG, "Console client secret")
                .default(&current.console_client_secret),
            &flags.console_client_secret,
        )?
    };

    let args = ExternalAuthArgs {
        name,
        issuer_url,
        issuer_audiences,
        issuer_ca_file,
        groups_claim,
        username_claim,
        claim_validation_rules,
        console_client_id,
        console_client_secret,
    };
    args.check_mandatory()?;
    Ok(args)
}
