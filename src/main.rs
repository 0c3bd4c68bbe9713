//! meshroll - restart Kubernetes workloads whose pods carry an injected mesh sidecar
//!
//! Finds every pod with a sidecar injector init container, walks its owner
//! references to the managing Deployment, DaemonSet or StatefulSet and
//! triggers a rolling restart so the pods come back with the current sidecar.

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use cli::ConfigSubcommand;
use meshroll::config::{ConfigLoader, PlatformWorkload};
use meshroll::kube::KubeCluster;
use meshroll::services::{NamespaceSelection, RolloutService};

/// Restart workloads whose pods carry an injected mesh sidecar
#[derive(Parser, Debug)]
#[command(name = "meshroll", version)]
#[command(about = "Restart workloads whose pods carry an injected mesh sidecar", long_about = None)]
struct Args {
    /// Namespace to search pods in
    #[arg(long, short = 'n')]
    namespace: Option<String>,

    /// Search pods in all namespaces except the configured skip list
    #[arg(long, short = 'A')]
    all_namespaces: bool,

    /// Path to the kubeconfig file (defaults to in-cluster config, $KUBECONFIG or ~/.kube/config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    context: Option<String>,

    /// Don't restart the configured platform workloads
    #[arg(long)]
    skip_platform: bool,

    /// Summary output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Config { subcommand }) => return cli::handle_config_command(subcommand),
        Some(Command::Version) => {
            cli::display_version();
            return Ok(());
        }
        None => {}
    }

    cli::init_logging(args.debug);

    // Configuration problems are fatal and must surface before any cluster call
    let selection = NamespaceSelection::from_flags(args.namespace.as_deref(), args.all_namespaces)?;
    let config = ConfigLoader::load().context("Failed to load configuration")?;
    tracing::debug!("Configuration loaded: {:?}", config);

    let client =
        meshroll::kube::create_client(args.kubeconfig.as_deref(), args.context.as_deref()).await?;
    tracing::info!(
        "Connected to Kubernetes cluster: {}",
        meshroll::kube::context_name(args.kubeconfig.as_deref(), args.context.as_deref())
    );

    let service = RolloutService::from_config(Arc::new(KubeCluster::new(client)), &config);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping after the current pod");
                cancel.cancel();
            }
        }
    });

    let namespaces = service
        .namespaces(&selection)
        .await
        .context("Failed to get namespaces")?;
    tracing::info!("Processing namespaces: {:?}", namespaces);

    let platform_workloads: &[PlatformWorkload] = if args.skip_platform {
        &[]
    } else {
        &config.platform_workloads
    };

    let summary = service.run(platform_workloads, &namespaces, &cancel).await;

    match args.output {
        OutputFormat::Text => println!("{}", summary),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        ),
    }

    Ok(())
}
