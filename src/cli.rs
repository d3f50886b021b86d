use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "hsdeps",
    about = "Extract the direct and transitive dependency graph of a Haskell project",
    version
)]
pub struct Cli {
    /// Project path to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Extraction strategy: cabal-install or stack [default: from config, then auto-detected]
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<String>,

    /// Config file [default: ./.hsdeps/config.toml, fallback ~/.config/hsdeps/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Also list transitive dependencies
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
