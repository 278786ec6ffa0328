//! Verb/noun entry points.
//!
//! Every command runs the same pipeline: load the cluster, check the gate,
//! reconcile options, build or plan, submit, optionally poll, render. The
//! first failing step ends the command; nothing after it runs.

pub mod break_glass;
pub mod dns_domain;
pub mod external_auth;
pub mod instance_types;
pub mod machine_pool;
pub mod tuning_config;

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::ClusterApi;
use crate::credential::KubeconfigPoller;
use crate::error::RosaError;
use crate::model::Cluster;
use crate::options::prompt::Prompter;
use crate::options::{ChangedFlags, InteractiveMode, Reconciler};
use crate::output::{self, OutputFormat};
use crate::reporter::Reporter;

/// Everything one command invocation needs.
pub struct Runtime {
    pub api: Arc<dyn ClusterApi>,
    pub reporter: Reporter,
    pub prompter: Arc<dyn Prompter>,
    pub interactive: InteractiveMode,
    pub flags: ChangedFlags,
    pub output: OutputFormat,
    /// Skip confirmation prompts.
    pub yes: bool,
    pub poller: KubeconfigPoller,
    pub cancel: CancellationToken,
}

impl Runtime {
    pub fn new(api: Arc<dyn ClusterApi>, reporter: Reporter, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            api,
            reporter,
            prompter,
            interactive: InteractiveMode::default(),
            flags: ChangedFlags::default(),
            output: OutputFormat::Human,
            yes: false,
            poller: KubeconfigPoller::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_flags(mut self, flags: ChangedFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_interactive(mut self, enabled: bool) -> Self {
        self.interactive = InteractiveMode::new(enabled);
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.yes = yes;
        self
    }

    pub fn with_poller(mut self, poller: KubeconfigPoller) -> Self {
        self.poller = poller;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(&self.flags, &self.interactive, self.prompter.as_ref(), &self.reporter)
    }

    pub async fn load_cluster(&self, key: &str) -> crate::Result<Cluster> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RosaError::Validation(
                "Expected a cluster name or identifier with the '--cluster' flag".to_string(),
            ));
        }
        tracing::debug!(cluster = %key, "loading cluster");
        self.api.get_cluster(key).await
    }

    /// Print `value` in the requested format; `human` produces the default
    /// rendering.
    fn render<T, F>(&self, value: &T, human: F) -> crate::Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> crate::Result<String>,
    {
        let text = if self.output.is_human() {
            human()?
        } else {
            output::serialize(value, self.output)?
        };
        self.reporter.print(&text);
        Ok(())
    }

    /// Ask before a destructive call. Without a terminal, `--yes` is required.
    fn confirm(&self, action: &str) -> crate::Result<bool> {
        if self.yes {
            return Ok(true);
        }
        if !self.reporter.is_terminal() {
            return Err(RosaError::Validation(format!(
                "Confirmation is required to {}: use '--yes'",
                action
            )));
        }
        self.prompter
            .confirm(&format!("Are you sure you want to {}?", action), false)
    }
}
