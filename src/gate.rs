//! Capability gate: may this cluster run this operation?
//!
//! Every cluster-scoped entry point goes through [`admits`] so the same
//! precondition always fails with the same message. Every operation needs a
//! hosted control plane.

use crate::error::RosaError;
use crate::model::Cluster;

/// Resource operations guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    BreakGlass,
    ExternalAuthCreate,
    ExternalAuth,
    TuningConfig,
    NodePoolUpgrade,
}

impl Operation {
    fn requires_ready(self) -> bool {
        matches!(
            self,
            Operation::BreakGlass
                | Operation::ExternalAuthCreate
                | Operation::ExternalAuth
                | Operation::NodePoolUpgrade
        )
    }

    fn requires_external_auth(self) -> bool {
        matches!(self, Operation::BreakGlass | Operation::ExternalAuth)
    }

    /// Feature name used in the hosted-control-plane message.
    fn feature(self) -> &'static str {
        match self {
            Operation::BreakGlass => "Break glass credential",
            Operation::ExternalAuthCreate | Operation::ExternalAuth => {
                "External authentication provider"
            }
            Operation::TuningConfig => "Tuning config",
            Operation::NodePoolUpgrade => "Machine pool upgrade",
        }
    }
}

/// Check `cluster` against the preconditions of `op`, in order: ready,
/// hosted control plane, external auth enabled. `key` is how the user named
/// the cluster and appears in messages.
pub fn admits(cluster: &Cluster, key: &str, op: Operation) -> crate::Result<()> {
    if op.requires_ready() && !cluster.is_ready() {
        return Err(RosaError::NotReady(key.to_string()));
    }
    if !cluster.is_hosted_control_plane() {
        return Err(RosaError::NotHostedControlPlane(op.feature().to_string()));
    }
    if op.requires_external_auth() && !cluster.external_auth_enabled() {
        return Err(RosaError::ExternalAuthNotEnabled(key.to_string()));
    }
    tracing::debug!(cluster = %key, operation = ?op, "cluster admits operation");
    Ok(())
}
