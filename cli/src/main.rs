//! rosa: command-line client for managed OpenShift clusters.
//!
//! Verbs come first, then the resource: `rosa upgrade machinepool np1 -c
//! mycluster --version 4.12.26`. Flags the user actually typed are collected
//! from clap's value sources so option reconciliation can tell "given" from
//! "defaulted".

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::parser::ValueSource;
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use rosa_core::commands::{
    break_glass, dns_domain, external_auth, instance_types, machine_pool, tuning_config,
};
use rosa_core::options::break_glass::BreakGlassFlags;
use rosa_core::options::external_auth::ExternalAuthFlags;
use rosa_core::options::tuning::TuningFlags;
use rosa_core::options::upgrade::UpgradeFlags;
use rosa_core::{
    ChangedFlags, ClusterApi, KubeconfigPoller, NonInteractivePrompter, OcmClient, OutputFormat,
    Prompter, Reporter, RosaConfig, RosaError, Runtime, TerminalPrompter,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Command-line client for managed OpenShift clusters.
#[derive(Parser)]
#[command(name = "rosa", version, about = "Command-line client for managed OpenShift clusters")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Verb,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to rosa.toml [default: ./rosa.toml or ~/.config/rosa/rosa.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable interactive mode
    #[arg(short, long, global = true)]
    interactive: bool,
    /// Output format: json or yaml (human-readable when omitted)
    #[arg(short, long, global = true)]
    output: Option<OutputFormat>,
    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,
    /// Log debug information to stderr
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Args)]
struct ClusterArg {
    /// Name or ID of the cluster
    #[arg(short, long)]
    cluster: Option<String>,
}

impl ClusterArg {
    fn key(&self) -> &str {
        self.cluster.as_deref().unwrap_or_default()
    }
}

#[derive(Subcommand)]
enum Verb {
    /// Create a resource
    Create {
        #[command(subcommand)]
        resource: CreateCmd,
    },
    /// Show details of a resource
    Describe {
        #[command(subcommand)]
        resource: DescribeCmd,
    },
    /// List resources
    List {
        #[command(subcommand)]
        resource: ListCmd,
    },
    /// Edit a resource
    Edit {
        #[command(subcommand)]
        resource: EditCmd,
    },
    /// Delete a resource
    Delete {
        #[command(subcommand)]
        resource: DeleteCmd,
    },
    /// Revoke credentials
    Revoke {
        #[command(subcommand)]
        resource: RevokeCmd,
    },
    /// Schedule an upgrade
    Upgrade {
        #[command(subcommand)]
        resource: UpgradeCmd,
    },
}

#[derive(Args)]
struct BreakGlassOpts {
    /// Username for the credential
    #[arg(long)]
    username: Option<String>,
    /// Lifetime of the credential, e.g. 1h30m
    #[arg(long)]
    expiration: Option<String>,
}

impl From<BreakGlassOpts> for BreakGlassFlags {
    fn from(o: BreakGlassOpts) -> Self {
        Self {
            username: o.username.unwrap_or_default(),
            expiration: o.expiration.unwrap_or_default(),
        }
    }
}

#[derive(Args)]
struct ExternalAuthOpts {
    /// Name of the provider
    #[arg(long)]
    name: Option<String>,
    /// Issuer URL, must use https
    #[arg(long)]
    issuer_url: Option<String>,
    /// Audiences, comma separated or repeated
    #[arg(long)]
    issuer_audiences: Vec<String>,
    /// Path to a PEM file with the issuer CA
    #[arg(long)]
    issuer_ca_file: Option<String>,
    /// Token claim holding the groups
    #[arg(long)]
    claim_mapping_groups_claim: Option<String>,
    /// Token claim holding the username
    #[arg(long)]
    claim_mapping_username_claim: Option<String>,
    /// Required claim as claim:value, repeatable
    #[arg(long)]
    claim_validation_rule: Vec<String>,
    /// OIDC client id for the console
    #[arg(long)]
    console_client_id: Option<String>,
    /// OIDC client secret for the console
    #[arg(long)]
    console_client_secret: Option<String>,
}

impl From<ExternalAuthOpts> for ExternalAuthFlags {
    fn from(o: ExternalAuthOpts) -> Self {
        Self {
            name: o.name.unwrap_or_default(),
            issuer_url: o.issuer_url.unwrap_or_default(),
            issuer_audiences: o.issuer_audiences,
            issuer_ca_file: o.issuer_ca_file.unwrap_or_default(),
            groups_claim: o.claim_mapping_groups_claim.unwrap_or_default(),
            username_claim: o.claim_mapping_username_claim.unwrap_or_default(),
            claim_validation_rules: o.claim_validation_rule,
            console_client_id: o.console_client_id.unwrap_or_default(),
            console_client_secret: o.console_client_secret.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum CreateCmd {
    /// Create a break glass credential and wait for its kubeconfig
    #[command(aliases = ["break-glass-credentials", "break-glass"])]
    BreakGlassCredential {
        #[command(flatten)]
        cluster: ClusterArg,
        #[command(flatten)]
        opts: BreakGlassOpts,
    },
    /// Create an external authentication provider
    #[command(aliases = ["external-auth-providers", "external-auth"])]
    ExternalAuthProvider {
        #[command(flatten)]
        cluster: ClusterArg,
        #[command(flatten)]
        opts: ExternalAuthOpts,
    },
    /// Create a tuning config
    #[command(aliases = ["tuning-configs"])]
    TuningConfig {
        #[command(flatten)]
        cluster: ClusterArg,
        /// Name of the tuning config
        #[arg(long)]
        name: Option<String>,
        /// Path to the TuneD spec file (JSON or YAML)
        #[arg(long)]
        spec_path: Option<String>,
    },
    /// Reserve a DNS domain
    #[command(aliases = ["dns-domains"])]
    DnsDomain {
        /// Reserve the domain for a hosted control plane cluster
        #[arg(long)]
        hosted_cp: bool,
    },
}

#[derive(Subcommand)]
enum DescribeCmd {
    /// Show a break glass credential
    #[command(aliases = ["break-glass-credentials", "break-glass"])]
    BreakGlassCredential {
        #[command(flatten)]
        cluster: ClusterArg,
        /// ID of the credential
        credential_id: Option<String>,
        /// ID of the credential
        #[arg(long = "id")]
        id: Option<String>,
        /// Print only the kubeconfig
        #[arg(long)]
        kubeconfig: bool,
    },
    /// Show an external authentication provider
    #[command(aliases = ["external-auth-providers", "external-auth"])]
    ExternalAuthProvider {
        #[command(flatten)]
        cluster: ClusterArg,
        #[arg(long)]
        name: Option<String>,
    },
    /// Show a tuning config
    #[command(aliases = ["tuning-configs"])]
    TuningConfig {
        #[command(flatten)]
        cluster: ClusterArg,
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum ListCmd {
    #[command(aliases = ["break-glass-credential", "break-glass"])]
    BreakGlassCredentials {
        #[command(flatten)]
        cluster: ClusterArg,
    },
    #[command(aliases = ["external-auth-provider", "external-auth"])]
    ExternalAuthProviders {
        #[command(flatten)]
        cluster: ClusterArg,
    },
    #[command(aliases = ["tuning-config"])]
    TuningConfigs {
        #[command(flatten)]
        cluster: ClusterArg,
    },
    #[command(aliases = ["dns-domain"])]
    DnsDomains {
        /// Only hosted control plane domains
        #[arg(long)]
        hosted_cp: bool,
    },
    #[command(aliases = ["instance-type", "machine-types"])]
    InstanceTypes,
}

#[derive(Subcommand)]
enum EditCmd {
    /// Edit an external authentication provider
    #[command(aliases = ["external-auth-providers", "external-auth"])]
    ExternalAuthProvider {
        #[command(flatten)]
        cluster: ClusterArg,
        #[command(flatten)]
        opts: ExternalAuthOpts,
    },
    /// Replace the spec of a tuning config
    #[command(aliases = ["tuning-configs"])]
    TuningConfig {
        #[command(flatten)]
        cluster: ClusterArg,
        name: Option<String>,
        /// Path to the TuneD spec file (JSON or YAML)
        #[arg(long)]
        spec_path: Option<String>,
    },
}

#[derive(Subcommand)]
enum DeleteCmd {
    #[command(aliases = ["external-auth-providers", "external-auth"])]
    ExternalAuthProvider {
        #[command(flatten)]
        cluster: ClusterArg,
        #[arg(long)]
        name: Option<String>,
    },
    #[command(aliases = ["tuning-configs"])]
    TuningConfig {
        #[command(flatten)]
        cluster: ClusterArg,
        name: Option<String>,
    },
    #[command(aliases = ["dns-domains"])]
    DnsDomain { id: Option<String> },
}

#[derive(Subcommand)]
enum RevokeCmd {
    /// Revoke every break glass credential of a cluster
    #[command(aliases = ["break-glass-credentials", "break-glass"])]
    BreakGlassCredential {
        #[command(flatten)]
        cluster: ClusterArg,
    },
}

#[derive(Subcommand)]
enum UpgradeCmd {
    /// Schedule an upgrade of a hosted control plane machine pool
    #[command(name = "machinepool", aliases = ["machinepools", "machine-pool"])]
    MachinePool {
        #[command(flatten)]
        cluster: ClusterArg,
        /// ID of the machine pool
        node_pool_id: Option<String>,
        /// Target version
        #[arg(long)]
        version: Option<String>,
        /// Date of the upgrade, yyyy-mm-dd UTC
        #[arg(long)]
        schedule_date: Option<String>,
        /// Time of the upgrade, HH:mm UTC
        #[arg(long)]
        schedule_time: Option<String>,
        /// Cron expression for recurring upgrades, UTC
        #[arg(long)]
        schedule: Option<String>,
        /// Let recurring upgrades cross minor versions
        #[arg(long)]
        allow_minor_version_upgrades: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_tracing(cli.global.debug);
    let changed = changed_flags(&matches);

    match run(cli, changed).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            Reporter::terminal().error(format!("{:#}", err));
            let code = err
                .downcast_ref::<RosaError>()
                .map(RosaError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("rosa_core=debug,rosa=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Long names of the flags given on the command line for the leaf command.
fn changed_flags(matches: &ArgMatches) -> ChangedFlags {
    let mut leaf = matches;
    while let Some((_, sub)) = leaf.subcommand() {
        leaf = sub;
    }
    ChangedFlags::new(
        leaf.ids()
            .filter(|id| leaf.value_source(id.as_str()) == Some(ValueSource::CommandLine))
            .map(|id| id.as_str().replace('_', "-")),
    )
}

async fn run(cli: Cli, changed: ChangedFlags) -> Result<()> {
    let config = load_config(cli.global.config).await?;
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::debug!("interrupted");
        cancel_for_signal.cancel();
    });

    let reporter = Reporter::terminal();
    let prompter: Arc<dyn Prompter> = if reporter.is_terminal() {
        Arc::new(TerminalPrompter::default())
    } else {
        Arc::new(NonInteractivePrompter)
    };
    let api: Arc<dyn ClusterApi> = Arc::new(OcmClient::new(&config)?);

    let rt = Runtime::new(api, reporter, prompter)
        .with_flags(changed)
        .with_interactive(cli.global.interactive)
        .with_output(cli.global.output.unwrap_or_default())
        .assume_yes(cli.global.yes)
        .with_poller(KubeconfigPoller::new(config.poll_interval(), config.poll_timeout()))
        .with_cancel(cancel);

    dispatch(&rt, cli.command).await?;
    Ok(())
}

async fn dispatch(rt: &Runtime, verb: Verb) -> rosa_core::Result<()> {
    match verb {
        Verb::Create { resource } => match resource {
            CreateCmd::BreakGlassCredential { cluster, opts } => {
                break_glass::create(rt, cluster.key(), &opts.into()).await
            }
            CreateCmd::ExternalAuthProvider { cluster, opts } => {
                external_auth::create(rt, cluster.key(), &opts.into()).await
            }
            CreateCmd::TuningConfig {
                cluster,
                name,
                spec_path,
            } => {
                let flags = TuningFlags {
                    name: name.unwrap_or_default(),
                    spec_path: spec_path.unwrap_or_default(),
                };
                tuning_config::create(rt, cluster.key(), &flags).await
            }
            CreateCmd::DnsDomain { hosted_cp } => dns_domain::create(rt, hosted_cp).await,
        },
        Verb::Describe { resource } => match resource {
            DescribeCmd::BreakGlassCredential {
                cluster,
                credential_id,
                id,
                kubeconfig,
            } => {
                let id = credential_id.or(id).unwrap_or_default();
                break_glass::describe(rt, cluster.key(), &id, kubeconfig).await
            }
            DescribeCmd::ExternalAuthProvider { cluster, name } => {
                external_auth::describe(rt, cluster.key(), name.as_deref().unwrap_or_default())
                    .await
            }
            DescribeCmd::TuningConfig { cluster, name } => {
                tuning_config::describe(rt, cluster.key(), name.as_deref().unwrap_or_default())
                    .await
            }
        },
        Verb::List { resource } => match resource {
            ListCmd::BreakGlassCredentials { cluster } => {
                break_glass::list(rt, cluster.key()).await
            }
            ListCmd::ExternalAuthProviders { cluster } => {
                external_auth::list(rt, cluster.key()).await
            }
            ListCmd::TuningConfigs { cluster } => tuning_config::list(rt, cluster.key()).await,
            ListCmd::DnsDomains { hosted_cp } => dns_domain::list(rt, hosted_cp).await,
            ListCmd::InstanceTypes => instance_types::list(rt).await,
        },
        Verb::Edit { resource } => match resource {
            EditCmd::ExternalAuthProvider { cluster, opts } => {
                let flags: ExternalAuthFlags = opts.into();
                let name = flags.name.clone();
                external_auth::edit(rt, cluster.key(), &name, &flags).await
            }
            EditCmd::TuningConfig {
                cluster,
                name,
                spec_path,
            } => {
                let flags = TuningFlags {
                    name: String::new(),
                    spec_path: spec_path.unwrap_or_default(),
                };
                let name = name.unwrap_or_default();
                tuning_config::edit(rt, cluster.key(), &name, &flags).await
            }
        },
        Verb::Delete { resource } => match resource {
            DeleteCmd::ExternalAuthProvider { cluster, name } => {
                external_auth::delete(rt, cluster.key(), name.as_deref().unwrap_or_default())
                    .await
            }
            DeleteCmd::TuningConfig { cluster, name } => {
                tuning_config::delete(rt, cluster.key(), name.as_deref().unwrap_or_default())
                    .await
            }
            DeleteCmd::DnsDomain { id } => {
                dns_domain::delete(rt, id.as_deref().unwrap_or_default()).await
            }
        },
        Verb::Revoke { resource } => match resource {
            RevokeCmd::BreakGlassCredential { cluster } => {
                break_glass::revoke(rt, cluster.key()).await
            }
        },
        Verb::Upgrade { resource } => match resource {
            UpgradeCmd::MachinePool {
                cluster,
                node_pool_id,
                version,
                schedule_date,
                schedule_time,
                schedule,
                allow_minor_version_upgrades,
            } => {
                let flags = UpgradeFlags {
                    version: version.unwrap_or_default(),
                    schedule_date: schedule_date.unwrap_or_default(),
                    schedule_time: schedule_time.unwrap_or_default(),
                    schedule: schedule.unwrap_or_default(),
                    allow_minor_version_upgrades,
                };
                let node_pool_id = node_pool_id.unwrap_or_default();
                machine_pool::upgrade(rt, cluster.key(), &node_pool_id, &flags).await
            }
        },
    }
}

/// Resolve config file path: explicit flag → ./rosa.toml → ~/.config/rosa/rosa.toml.
fn resolve_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    let local = Path::new("rosa.toml");
    if local.exists() {
        return Some(local.to_path_buf());
    }

    let config_dir = dirs::config_dir()?;
    let xdg = config_dir.join("rosa").join("rosa.toml");
    xdg.exists().then_some(xdg)
}

/// Load the config file, or fall back to defaults when there is none.
async fn load_config(explicit: Option<PathBuf>) -> Result<RosaConfig> {
    match resolve_config(explicit) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            Ok(RosaConfig::load(&path).await?)
        }
        None => {
            let config = RosaConfig::default();
            config.validate("defaults")?;
            Ok(config)
        }
    }
}
