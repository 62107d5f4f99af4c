// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use skylift::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skylift")]
#[command(about = "Release orchestrator for static sites on S3 and CloudFront")]
#[command(version)]
pub struct Cli {
    /// Show debug logs and stream engine output
    #[arg(
        short,
        long,
        global = true,
        env = "SKYLIFT_VERBOSE",
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Normal)]
    pub output: OutputFormat,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Normal,
    Quiet,
    Json,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Normal => OutputMode::Normal,
            OutputFormat::Quiet => OutputMode::Quiet,
            OutputFormat::Json => OutputMode::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new skylift.yml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Manage site infrastructure with the IaC engine
    Infra {
        #[command(subcommand)]
        action: InfraAction,
    },

    /// Upload the build directory and invalidate the CDN cache
    Deploy {
        /// Show what would be uploaded without touching AWS
        #[arg(long)]
        dry_run: bool,

        /// Read bucket and distribution from infrastructure outputs first
        #[arg(long)]
        from_infra: bool,

        #[command(flatten)]
        lock: LockArgs,
    },

    /// Probe the configured site URLs
    Health,
}

#[derive(Subcommand)]
pub enum InfraAction {
    /// Initialize and compute a plan
    Plan {
        #[command(flatten)]
        lock: LockArgs,
    },

    /// Plan, then apply the saved plan and print outputs
    Apply {
        /// Skip the engine's confirmation prompt
        #[arg(long)]
        auto_approve: bool,

        /// Plan only; apply nothing
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        lock: LockArgs,
    },

    /// Destroy all declared infrastructure
    Destroy {
        /// Skip both confirmation prompts
        #[arg(long)]
        auto_approve: bool,

        #[command(flatten)]
        lock: LockArgs,
    },

    /// Print infrastructure outputs
    Output {
        /// Print S3_BUCKET=... and CLOUDFRONT_DISTRIBUTION_ID=... lines
        #[arg(long)]
        export: bool,

        #[command(flatten)]
        lock: LockArgs,
    },
}

#[derive(Debug, Clone, Copy, Args)]
pub struct LockArgs {
    /// Break an existing infrastructure lock
    #[arg(long)]
    pub force_unlock: bool,
}
