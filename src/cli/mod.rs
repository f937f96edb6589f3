//! CLI definitions and entry point.

use crate::gate::MatchMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Server-side push gate: branch naming policy and incremental style checks
#[derive(Parser, Debug)]
#[command(name = "push-gate", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Explicit config file (YAML)
    #[arg(long, global = true, env = "PUSH_GATE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Trunk branch that new work is measured against
    #[arg(long, global = true)]
    pub trunk: Option<String>,

    /// Skip the style check (branch naming still applies)
    #[arg(long, global = true)]
    pub no_lint: bool,

    /// Where branch prefixes must match
    #[arg(long = "match", global = true, value_enum)]
    pub match_mode: Option<MatchArg>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append logs to this file (JSON lines) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a push (pre-receive hook mode)
    ///
    /// Reads `<old> <new> <ref>` lines from stdin unless --event is given.
    Check(CheckArgs),

    /// Test a branch name against the naming convention
    Branch(BranchArgs),

    /// Print the 1-indexed lines of NEW that are added or changed relative to OLD
    NewLines(NewLinesArgs),

    /// Show the effective configuration
    Config(ConfigArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// A single push event: "<old> <new> <ref>"
    #[arg(long, value_name = "EVENT")]
    pub event: Option<String>,

    /// Repository directory (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BranchArgs {
    /// Branch name, without refs/heads/
    pub name: String,

    /// Repository whose config to use (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct NewLinesArgs {
    /// Previous version of the file
    pub old: PathBuf,

    /// Current version of the file
    pub new: PathBuf,

    /// Treat the file as newly added (OLD is ignored)
    #[arg(long)]
    pub added: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// List the recognised keys instead of the effective values
    #[arg(long, short = 'l')]
    pub list: bool,

    /// Repository whose config to include (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// `--match` values.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum MatchArg {
    /// Anywhere in the branch name
    Anywhere,
    /// At the start of the branch name
    Start,
}

impl From<MatchArg> for MatchMode {
    fn from(arg: MatchArg) -> Self {
        match arg {
            MatchArg::Anywhere => Self::Anywhere,
            MatchArg::Start => Self::Start,
        }
    }
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}
