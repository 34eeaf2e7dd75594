use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use zoomprune_config::DEFAULT_CONFIG_FILE;
use zoomprune_reduce::{ReduceOptions, ZoomConvention};

#[derive(Parser)]
#[command(
    name = "zoomprune",
    about = "Remove deep zoom levels from a rendered tile pyramid",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Viewer configuration file written by the renderer
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List configured worlds and their zoom depth
    List(ListArgs),
    /// Remove zoom levels from one or more worlds
    Remove(RemoveArgs),
}

#[derive(Args)]
pub struct ListArgs {}

#[derive(Args)]
pub struct RemoveArgs {
    /// Number of zoom levels to remove
    #[arg(short, long)]
    pub num: u32,
    /// World path to include in the operation (repeatable)
    #[arg(short, long = "world", required = true)]
    pub worlds: Vec<String>,
    /// Report what would be removed without deleting anything
    #[arg(long)]
    pub dry_run: bool,
    /// Remove directories left empty by the reduction
    #[arg(long)]
    pub prune_empty_dirs: bool,
    /// Count zoom levels over the whole tile path instead of from the world root
    #[arg(long)]
    pub count_path_segments: bool,
}

impl RemoveArgs {
    pub fn reduce_options(&self) -> ReduceOptions {
        ReduceOptions {
            dry_run: self.dry_run,
            prune_empty_dirs: self.prune_empty_dirs,
            convention: if self.count_path_segments {
                ZoomConvention::PathSegments
            } else {
                ZoomConvention::RootRelative
            },
        }
    }
}
