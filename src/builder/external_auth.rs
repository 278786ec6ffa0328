use crate::error::RosaError;
use crate::model::{
    ClaimMappings, ClaimRef, ClientComponent, ExternalAuth, ExternalAuthClient, TokenClaims,
    TokenIssuer, ValidationRule,
};
use crate::options::external_auth::ExternalAuthArgs;
use crate::options::validate::split_claim_rule;

/// Assemble an external auth provider payload.
///
/// The claim sub-tree appears only when a claim option is set, the clients
/// list only when a console client id or secret is set. Malformed validation
/// rules are dropped here; the reconciler rejects them earlier.
pub fn build_external_auth(args: &ExternalAuthArgs) -> crate::Result<ExternalAuth> {
    args.check_mandatory()?;

    let ca = if args.issuer_ca_file.is_empty() {
        String::new()
    } else {
        std::fs::read_to_string(&args.issuer_ca_file).map_err(|e| {
            RosaError::Validation(format!("expected a valid certificate bundle: {}", e))
        })?
    };

    let issuer = TokenIssuer {
        url: args.issuer_url.clone(),
        audiences: args.issuer_audiences.clone(),
        ca,
    };

    let claim = build_claims(args);

    let clients = if args.console_client_id.is_empty() && args.console_client_secret.is_empty() {
        Vec::new()
    } else {
        vec![ExternalAuthClient {
            id: args.console_client_id.clone(),
            secret: args.console_client_secret.clone(),
            component: ClientComponent::console(),
        }]
    };

    Ok(ExternalAuth {
        id: args.name.clone(),
        issuer,
        claim,
        clients,
    })
}

fn build_claims(args: &ExternalAuthArgs) -> Option<TokenClaims> {
    let has_groups = !args.groups_claim.is_empty();
    let has_username = !args.username_claim.is_empty();
    let validation_rules: Vec<ValidationRule> = args
        .claim_validation_rules
        .iter()
        .filter_map(|rule| split_claim_rule(rule))
        .map(|(claim, required)| ValidationRule {
            claim: claim.to_string(),
            required_value: required.to_string(),
        })
        .collect();
    if !has_groups && !has_username && validation_rules.is_empty() {
        return None;
    }

    let mappings = (has_groups || has_username).then(|| ClaimMappings {
        groups: has_groups.then(|| ClaimRef {
            claim: args.groups_claim.clone(),
        }),
        user_name: has_username.then(|| ClaimRef {
            claim: args.username_claim.clone(),
        }),
    });

    Some(TokenClaims {
        mappings,
        validation_rules,
    })
}

/// Inverse of [`build_external_auth`], used to seed `edit` with the current
/// provider. The CA bundle is not round-tripped.
pub fn args_from_external_auth(auth: &ExternalAuth) -> ExternalAuthArgs {
    let mappings = auth.claim.as_ref().and_then(|c| c.mappings.as_ref());
    let client = auth.clients.first();
    ExternalAuthArgs {
        name: auth.id.clone(),
        issuer_url: auth.issuer.url.clone(),
        issuer_audiences: auth.issuer.audiences.clone(),
        issuer_ca_file: String::new(),
        groups_claim: mappings
            .and_then(|m| m.groups.as_ref())
            .map(|g| g.claim.clone())
            .unwrap_or_default(),
        username_claim: mappings
            .and_then(|m| m.user_name.as_ref())
            .map(|u| u.claim.clone())
            .unwrap_or_default(),
        claim_validation_rules: auth
            .claim
            .as_ref()
            .map(|c| {
                c.validation_rules
                    .iter()
                    .map(|r| format!("{}:{}", r.claim, r.required_value))
                    .collect()
            })
            .unwrap_or_default(),
        console_client_id: client.map(|c| c.id.clone()).unwrap_or_default(),
        console_client_secret: String::new(),
    }
}
