mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "armctl")]
#[command(about = "Manage Azure Resource Manager resources of a cluster", long_about = None)]
struct Cli {
    /// Configuration file (default: discovered, see ARMHELPERS_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Deadline for the whole command in seconds (default: operation_timeout_secs)
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resource groups
    #[command(subcommand)]
    Group(GroupCommands),
    /// Template deployments
    #[command(subcommand)]
    Deployment(DeploymentCommands),
    /// Virtual machines
    #[command(subcommand)]
    Vm(VmCommands),
    /// Managed disks
    #[command(subcommand)]
    Disk(DiskCommands),
    /// Network interfaces
    #[command(subcommand)]
    Nic(NicCommands),
    /// Role assignments
    #[command(subcommand)]
    Role(RoleCommands),
    /// Resource provider registration
    #[command(subcommand)]
    Providers(ProvidersCommands),
    /// Marketplace images
    #[command(subcommand)]
    Image(ImageCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum GroupCommands {
    /// Create or update a resource group, keeping its tags
    Ensure {
        name: String,
        #[arg(short, long)]
        location: String,
        /// Resource id of the managing resource
        #[arg(long)]
        managed_by: Option<String>,
        /// Tags to merge, as key=value
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },
    /// Delete a resource group and wait for it to be gone
    Delete { name: String },
    /// Check whether a resource group exists
    Exists { name: String },
}

#[derive(Subcommand)]
enum DeploymentCommands {
    /// Deploy a template (incremental) and wait for the result
    Create {
        #[arg(short = 'g', long)]
        resource_group: String,
        #[arg(short, long)]
        name: String,
        /// Template file (JSON)
        #[arg(long)]
        template: PathBuf,
        /// Parameters file (JSON)
        #[arg(long)]
        parameters: Option<PathBuf>,
    },
    /// Validate a template without deploying it
    Validate {
        #[arg(short = 'g', long)]
        resource_group: String,
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        parameters: Option<PathBuf>,
    },
    /// Show a deployment
    Show {
        #[arg(short = 'g', long)]
        resource_group: String,
        #[arg(short, long)]
        name: String,
    },
    /// Check whether a deployment exists
    Exists {
        #[arg(short = 'g', long)]
        resource_group: String,
        #[arg(short, long)]
        name: String,
    },
    /// List the operations of a deployment
    Operations {
        #[arg(short = 'g', long)]
        resource_group: String,
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum VmCommands {
    /// List virtual machines in a resource group
    List {
        #[arg(short = 'g', long)]
        resource_group: String,
    },
    /// Show a virtual machine
    Show {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
    /// Restart a virtual machine
    Restart {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
    /// Delete a virtual machine
    Delete {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
    /// Print the power state of a virtual machine
    PowerState {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
}

#[derive(Subcommand)]
enum DiskCommands {
    /// List managed disks in a resource group
    List {
        #[arg(short = 'g', long)]
        resource_group: String,
    },
    /// Show a managed disk
    Show {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
    /// Delete a managed disk
    Delete {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
}

#[derive(Subcommand)]
enum NicCommands {
    /// List network interfaces in a resource group
    List {
        #[arg(short = 'g', long)]
        resource_group: String,
    },
    /// Show a network interface
    Show {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
    /// Delete a network interface
    Delete {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
}

#[derive(Subcommand)]
enum RoleCommands {
    /// List role assignments of a principal in the subscription
    List {
        #[arg(short, long)]
        principal_id: String,
    },
    /// Delete a role assignment by its fully qualified id
    Delete { id: String },
}

#[derive(Subcommand)]
enum ProvidersCommands {
    /// List resource providers and their registration state
    List,
    /// Register the subscription with the required providers
    Ensure,
}

#[derive(Subcommand)]
enum ImageCommands {
    /// List image versions
    List {
        #[arg(short, long)]
        location: String,
        #[arg(long)]
        publisher: String,
        #[arg(long)]
        offer: String,
        #[arg(long)]
        sku: String,
    },
    /// Show one image version
    Show {
        #[arg(short, long)]
        location: String,
        #[arg(long)]
        publisher: String,
        #[arg(long)]
        offer: String,
        #[arg(long)]
        sku: String,
        version: String,
    },
}

fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid tag {:?}, expected key=value", s)),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // needs no configuration
    if matches!(cli.command, Commands::Version) {
        println!("armctl {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = armhelpers_config::load_config(cli.config)?;
    let session = client::Session::connect(&config, cli.timeout).await?;

    match cli.command {
        Commands::Group(cmd) => match cmd {
            GroupCommands::Ensure {
                name,
                location,
                managed_by,
                tags,
            } => {
                commands::group::ensure(
                    &session,
                    &name,
                    &location,
                    managed_by.as_deref(),
                    tags.into_iter().collect(),
                )
                .await?
            }
            GroupCommands::Delete { name } => commands::group::delete(&session, &name).await?,
            GroupCommands::Exists { name } => commands::group::exists(&session, &name).await?,
        },
        Commands::Deployment(cmd) => match cmd {
            DeploymentCommands::Create {
                resource_group,
                name,
                template,
                parameters,
            } => {
                commands::deployment::create(
                    &session,
                    &resource_group,
                    &name,
                    &template,
                    parameters.as_deref(),
                )
                .await?
            }
            DeploymentCommands::Validate {
                resource_group,
                name,
                template,
                parameters,
            } => {
                commands::deployment::validate(
                    &session,
                    &resource_group,
                    &name,
                    &template,
                    parameters.as_deref(),
                )
                .await?
            }
            DeploymentCommands::Show {
                resource_group,
                name,
            } => commands::deployment::show(&session, &resource_group, &name).await?,
            DeploymentCommands::Exists {
                resource_group,
                name,
            } => commands::deployment::exists(&session, &resource_group, &name).await?,
            DeploymentCommands::Operations {
                resource_group,
                name,
            } => commands::deployment::operations(&session, &resource_group, &name).await?,
        },
        Commands::Vm(cmd) => match cmd {
            VmCommands::List { resource_group } => {
                commands::vm::list(&session, &resource_group).await?
            }
            VmCommands::Show {
                resource_group,
                name,
            } => commands::vm::show(&session, &resource_group, &name).await?,
            VmCommands::Restart {
                resource_group,
                name,
            } => commands::vm::restart(&session, &resource_group, &name).await?,
            VmCommands::Delete {
                resource_group,
                name,
            } => commands::vm::delete(&session, &resource_group, &name).await?,
            VmCommands::PowerState {
                resource_group,
                name,
            } => commands::vm::power_state(&session, &resource_group, &name).await?,
        },
        Commands::Disk(cmd) => match cmd {
            DiskCommands::List { resource_group } => {
                commands::disk::list(&session, &resource_group).await?
            }
            DiskCommands::Show {
                resource_group,
                name,
            } => commands::disk::show(&session, &resource_group, &name).await?,
            DiskCommands::Delete {
                resource_group,
                name,
            } => commands::disk::delete(&session, &resource_group, &name).await?,
        },
        Commands::Nic(cmd) => match cmd {
            NicCommands::List { resource_group } => {
                commands::nic::list(&session, &resource_group).await?
            }
            NicCommands::Show {
                resource_group,
                name,
            } => commands::nic::show(&session, &resource_group, &name).await?,
            NicCommands::Delete {
                resource_group,
                name,
            } => commands::nic::delete(&session, &resource_group, &name).await?,
        },
        Commands::Role(cmd) => match cmd {
            RoleCommands::List { principal_id } => {
                commands::role::list(&session, &principal_id).await?
            }
            RoleCommands::Delete { id } => commands::role::delete(&session, &id).await?,
        },
        Commands::Providers(cmd) => match cmd {
            ProvidersCommands::List => commands::providers::list(&session).await?,
            ProvidersCommands::Ensure => commands::providers::ensure(&session).await?,
        },
        Commands::Image(cmd) => match cmd {
            ImageCommands::List {
                location,
                publisher,
                offer,
                sku,
            } => commands::image::list(&session, &location, &publisher, &offer, &sku).await?,
            ImageCommands::Show {
                location,
                publisher,
                offer,
                sku,
                version,
            } => {
                commands::image::show(&session, &location, &publisher, &offer, &sku, &version)
                    .await?
            }
        },
        Commands::Version => {}
    }

    Ok(())
}
