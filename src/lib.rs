//! rosa-core: resource-lifecycle orchestration for managed OpenShift clusters.
//!
//! Reconciles flags with interactive prompts, checks cluster preconditions,
//! builds requests for the cluster-management API, schedules node-pool
//! upgrades, waits for break glass credentials, and renders results.

pub mod api;
pub mod builder;
pub mod commands;
pub mod config;
pub mod credential;
pub mod cron;
pub mod error;
pub mod gate;
pub mod model;
pub mod options;
pub mod output;
pub mod reporter;
pub mod upgrade;
pub mod version;

pub use api::http::OcmClient;
pub use api::ClusterApi;
pub use commands::Runtime;
pub use config::{parse_env_ref, RosaConfig};
pub use credential::KubeconfigPoller;
pub use error::{Result, RosaError, EXIT_CANCELLED};
pub use gate::Operation;
pub use options::prompt::{NonInteractivePrompter, Prompter, TerminalPrompter};
pub use options::ChangedFlags;
pub use output::OutputFormat;
pub use reporter::Reporter;
pub use upgrade::UpgradePlanner;
