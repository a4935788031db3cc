use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mdchain",
    about = "Configure, name, and chain rigid-body MD runs",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    /// Log resolution and placement details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve a configuration and show its lineage and contents
    #[command(visible_alias = "i")]
    Inspect(InspectArgs),

    /// Mint, record, and assemble a run for the engine
    #[command(visible_alias = "p")]
    Prepare(PrepareArgs),
}

/// Options shared by all commands.
#[derive(Args)]
pub struct CommonOptions {
    /// Configuration document (looked up in the working directory if not a path)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Settings file (TOML) overriding directories and placement
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Args)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub common: CommonOptions,

    /// GPU the run is scheduled on
    #[arg(long, value_name = "N")]
    pub gpu: usize,

    /// Recorded frames (YAML) of the trajectory a continuation or fork starts from
    #[arg(long, value_name = "FILE")]
    pub frames: Option<PathBuf>,

    /// Run plan output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Do not record the project file in the GPU ledger
    #[arg(long)]
    pub no_ledger: bool,
}

impl Command {
    pub fn common(&self) -> &CommonOptions {
        match self {
            Command::Inspect(args) => &args.common,
            Command::Prepare(args) => &args.common,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
