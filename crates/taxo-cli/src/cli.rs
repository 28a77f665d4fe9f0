use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use taxo_diff::{NodeView, ViewMode};
use taxo_types::{Language, VersionHash};

#[derive(Parser)]
#[command(
    name = "taxo",
    about = "Compare taxonomy versions node by node",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare a node's subtree between two versions
    Diff(DiffArgs),
    /// Print a node's subtree as it exists in one version
    Show(ShowArgs),
    /// List the versions found in a snapshot directory
    Versions(VersionsArgs),
    /// Start the comparison HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    #[arg(long, default_value = "./snapshots")]
    pub snapshots: PathBuf,
    #[arg(long)]
    pub node: String,
    #[arg(long)]
    pub original: VersionHash,
    #[arg(long)]
    pub other: VersionHash,
    #[arg(long, default_value = "tree")]
    pub view: ViewMode,
    #[arg(long, default_value = "changed")]
    pub node_view: NodeView,
    /// Comma separated fields to highlight
    #[arg(long)]
    pub field_view: Option<String>,
    #[arg(long, default_value = "nb")]
    pub language: Language,
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(long, default_value = "./snapshots")]
    pub snapshots: PathBuf,
    #[arg(long)]
    pub node: String,
    #[arg(long)]
    pub version: VersionHash,
    #[arg(long, default_value = "nb")]
    pub language: Language,
}

#[derive(Args)]
pub struct VersionsArgs {
    #[arg(long, default_value = "./snapshots")]
    pub snapshots: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub snapshots: Option<PathBuf>,
}
