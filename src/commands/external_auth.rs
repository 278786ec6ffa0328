//! `create|list|describe|edit|delete external-auth-provider`.

use super::Runtime;
use crate::builder::{args_from_external_auth, build_external_auth};
use crate::error::RosaError;
use crate::gate::{self, Operation};
use crate::model::{Cluster, ExternalAuth};
use crate::options::external_auth::{self as opts, ExternalAuthArgs, ExternalAuthFlags};
use crate::output::{self, ExternalAuthList};

fn require_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(RosaError::Validation(
            "you need to specify an external authentication provider name with '--name' parameter"
                .to_string(),
        ));
    }
    Ok(())
}

async fn find(rt: &Runtime, cluster: &Cluster, name: &str) -> crate::Result<ExternalAuth> {
    rt.api
        .get_external_auth(&cluster.id, name)
        .await
        .map_err(|e| match e {
            RosaError::NotFound(_) => RosaError::NotFound(format!(
                "external authentication provider '{}' not found",
                name
            )),
            other => other,
        })
}

pub async fn create(rt: &Runtime, key: &str, flags: &ExternalAuthFlags) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::ExternalAuthCreate)?;

    let args = opts::reconcile(&rt.reconciler(), flags, &ExternalAuthArgs::default())?;
    let auth = build_external_auth(&args)?;

    rt.api
        .create_external_auth(&cluster.id, &auth)
        .await
        .map_err(|e| {
            e.context(format!(
                "failed to create an external authentication provider for cluster '{}'",
                key
            ))
        })?;
    tracing::info!(cluster = %key, provider = %auth.id, "external authentication provider created");
    rt.reporter.info(format!(
        "Successfully created an external authentication provider '{}' for cluster '{}'",
        auth.id, key
    ));
    Ok(())
}

pub async fn list(rt: &Runtime, key: &str) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::ExternalAuth)?;

    let providers = rt.api.list_external_auths(&cluster.id).await?;
    if providers.is_empty() && rt.output.is_human() {
        rt.reporter.info(format!(
            "There are no external authentication providers for cluster '{}'",
            key
        ));
        return Ok(());
    }
    rt.render(&providers, || Ok(output::table(&ExternalAuthList(&providers))))
}

pub async fn describe(rt: &Runtime, key: &str, name: &str) -> crate::Result<()> {
    require_name(name)?;
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::ExternalAuth)?;

    let auth = find(rt, &cluster, name).await?;
    rt.render(&auth, || Ok(output::describe_external_auth(&cluster, &auth)))
}

/// Re-run option reconciliation with the current provider as defaults and
/// patch the result.
pub async fn edit(
    rt: &Runtime,
    key: &str,
    name: &str,
    flags: &ExternalAuthFlags,
) -> crate::Result<()> {
    require_name(name)?;
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::ExternalAuth)?;

    let current = find(rt, &cluster, name).await?;
    let args = opts::reconcile(&rt.reconciler(), flags, &args_from_external_auth(&current))?;
    let auth = build_external_auth(&args)?;

    rt.api
        .update_external_auth(&cluster.id, &auth)
        .await
        .map_err(|e| {
            e.context(format!(
                "failed to update external authentication provider '{}' for cluster '{}'",
                name, key
            ))
        })?;
    rt.reporter.info(format!(
        "Updated external authentication provider '{}' for cluster '{}'",
        name, key
    ));
    Ok(())
}

pub async fn delete(rt: &Runtime, key: &str, name: &str) -> crate::Result<()> {
    require_name(name)?;
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::ExternalAuth)?;

    find(rt, &cluster, name).await?;
    if !rt.confirm(&format!(
        "delete external authentication provider '{}' on cluster '{}'",
        name, key
    ))? {
        return Ok(());
    }
    rt.api
        .delete_external_auth(&cluster.id, name)
        .await
        .map_err(|e| {
            e.context(format!(
                "failed to delete external authentication provider '{}' on cluster '{}'",
                name, key
            ))
        })?;
    rt.reporter.info(format!(
        "Successfully deleted external authentication provider '{}' from cluster '{}'",
        name, key
    ));
    Ok(())
}
