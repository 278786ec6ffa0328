//! `create|list|describe|revoke break-glass-credential`.

use super::Runtime;
use crate::builder::build_break_glass;
use crate::credential;
use crate::error::RosaError;
use crate::gate::{self, Operation};
use crate::model::BreakGlassCredentialRequest;
use crate::options::break_glass::{self as opts, BreakGlassFlags};
use crate::output::{self, BreakGlassList};

fn kubeconfig_hint(credential_id: &str, key: &str) -> String {
    format!(
        "To retrieve only the kubeconfig for this credential use: \
         'rosa describe break-glass-credential {} -c {} --kubeconfig'",
        credential_id, key
    )
}

pub async fn create(rt: &Runtime, key: &str, flags: &BreakGlassFlags) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::BreakGlass)?;

    let args = opts::reconcile(&rt.reconciler(), flags)?;
    let request = match &args {
        Some(args) => build_break_glass(args)?,
        None => BreakGlassCredentialRequest::default(),
    };

    let created = credential::create(rt.api.as_ref(), &cluster.id, key, &request).await?;
    rt.reporter.info(format!(
        "Successfully created a break glass credential for cluster '{}'. Waiting for it to be issued",
        key
    ));

    rt.poller
        .poll(rt.api.as_ref(), &cluster.id, key, &created.id, &rt.cancel)
        .await?;
    rt.reporter.info(kubeconfig_hint(&created.id, key));
    Ok(())
}

pub async fn list(rt: &Runtime, key: &str) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::BreakGlass)?;

    let credentials = credential::list(rt.api.as_ref(), &cluster.id, key).await?;
    if credentials.is_empty() && rt.output.is_human() {
        rt.reporter.info(format!(
            "There are no break glass credentials for cluster '{}'",
            key
        ));
        return Ok(());
    }
    rt.render(&credentials, || Ok(output::table(&BreakGlassList(&credentials))))
}

/// Show one credential, or with `kubeconfig` only its kubeconfig.
pub async fn describe(
    rt: &Runtime,
    key: &str,
    credential_id: &str,
    kubeconfig: bool,
) -> crate::Result<()> {
    if credential_id.is_empty() {
        return Err(RosaError::Validation(
            "you need to specify a break glass credential id with '--id' parameter".to_string(),
        ));
    }
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::BreakGlass)?;

    if !kubeconfig {
        rt.reporter.info(kubeconfig_hint(credential_id, key));
    }
    let credential = credential::describe(rt.api.as_ref(), &cluster.id, key, credential_id).await?;

    if !rt.output.is_human() {
        return rt.render(&credential, || Ok(String::new()));
    }
    if kubeconfig {
        if credential.kubeconfig.is_empty() {
            rt.reporter.info(
                "The credential is not ready yet. Please wait a few minutes for it to be fully ready.",
            );
        } else {
            rt.reporter.print(&credential.kubeconfig);
        }
        return Ok(());
    }
    rt.reporter.print(&output::describe_break_glass(&credential));
    Ok(())
}

pub async fn revoke(rt: &Runtime, key: &str) -> crate::Result<()> {
    let cluster = rt.load_cluster(key).await?;
    gate::admits(&cluster, key, Operation::BreakGlass)?;

    if !rt.confirm(&format!(
        "revoke all the break glass credentials on cluster '{}'",
        key
    ))? {
        return Ok(());
    }
    credential::revoke_all(rt.api.as_ref(), &cluster.id, key).await?;
    rt.reporter.info(format!(
        "Successfully requested revocation for all break glass credentials from cluster '{}'",
        key
    ));
    Ok(())
}
