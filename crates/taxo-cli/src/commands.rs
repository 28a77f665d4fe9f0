use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use taxo_diff::{compare_trees, project, ViewOptions};
use taxo_loader::{FsTreeLoader, TreeLoader};
use taxo_server::{CompareResponse, ServerConfig, TaxoServer};
use taxo_types::NodeId;

use crate::cli::*;
use crate::render;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = match cli.command {
        Command::Diff(args) => cmd_diff(args, &cli.format).await?,
        Command::Show(args) => cmd_show(args, &cli.format).await?,
        Command::Versions(args) => cmd_versions(args, &cli.format).await?,
        Command::Serve(args) => return cmd_serve(args).await,
    };
    print!("{output}");
    Ok(())
}

async fn cmd_diff(args: DiffArgs, format: &OutputFormat) -> anyhow::Result<String> {
    let loader = FsTreeLoader::new(&args.snapshots);
    let node_id = NodeId::new(args.node);
    let (original, other) = loader
        .fetch_pair(&node_id, &args.original, &args.other, &args.language)
        .await
        .with_context(|| format!("loading {node_id} from {}", args.snapshots.display()))?;

    let mut options = ViewOptions::new(args.view, args.node_view);
    options.field_view = args.field_view;

    let tree = compare_trees(&original, &other);
    let summary = tree.summary();
    debug!(identities = tree.len(), changes = summary.total(), "diff complete");
    let view = project(tree, &options);

    match format {
        OutputFormat::Json => {
            let response = CompareResponse {
                node_id,
                original_hash: args.original,
                other_hash: args.other,
                identical: view.is_identical(),
                options,
                summary,
                view,
            };
            Ok(format!("{}\n", serde_json::to_string_pretty(&response)?))
        }
        OutputFormat::Text => {
            let mut out = render::render_view(&view, options.field_view.as_deref());
            if !view.is_identical() {
                out.push_str(&render::render_summary(&summary));
                out.push('\n');
            }
            Ok(out)
        }
    }
}

async fn cmd_show(args: ShowArgs, format: &OutputFormat) -> anyhow::Result<String> {
    let loader = FsTreeLoader::new(&args.snapshots);
    let tree = loader
        .fetch_tree(&NodeId::new(args.node), &args.version, &args.language)
        .await?;
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&tree)?)),
        OutputFormat::Text => Ok(render::render_tree(&tree)),
    }
}

async fn cmd_versions(args: VersionsArgs, format: &OutputFormat) -> anyhow::Result<String> {
    let loader = FsTreeLoader::new(&args.snapshots);
    let versions = loader
        .list_versions()
        .await
        .with_context(|| format!("reading {}", args.snapshots.display()))?;
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&versions)?)),
        OutputFormat::Text => Ok(render::render_versions(&versions)),
    }
}

fn serve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(snapshots) = &args.snapshots {
        config.snapshot_root = snapshots.clone();
    }
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(&args)?;
    let loader = Arc::new(FsTreeLoader::new(config.snapshot_root.clone()));
    TaxoServer::with_loader(config, loader).serve().await?;
    Ok(())
}
