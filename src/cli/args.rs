//! Command line arguments for campaign-audit.
//!
//! Precedence: CLI flags > config file > defaults. Flags only override the
//! configuration when they are given.

use crate::config::AuditConfig;
use crate::Category;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "campaign-audit",
    version,
    about = "Read-only best-practice audit for advertising accounts",
    long_about = "campaign-audit walks an account snapshot (account, campaigns, ad groups, keywords, ads), evaluates best-practice rules and reports findings grouped by category.\n\nConfiguration precedence: CLI > config file > defaults.",
    after_help = "Examples:\n  campaign-audit audit --snapshot account.json\n  campaign-audit audit --snapshot account.json --format json --output-dir reports/\n  campaign-audit audit --snapshot account.json --category keywords --skip KW-003\n  campaign-audit list",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the audit against an account snapshot
    Audit(AuditArgs),
    /// List all check modules
    List,
    /// Print version information
    Version,
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// JUnit XML for CI/CD integration
    Junit,
}

#[derive(Debug, Clone, Args)]
pub struct AuditArgs {
    /// Account snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write report sections and summary.json to this directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Only run modules of this category (repeatable)
    #[arg(long = "category", value_name = "NAME", value_parser = parse_category)]
    pub categories: Vec<Category>,

    /// Only run this module id (repeatable)
    #[arg(long, value_name = "ID")]
    pub only: Vec<String>,

    /// Report this module id as skipped instead of running it (repeatable)
    #[arg(long, value_name = "ID")]
    pub skip: Vec<String>,

    /// Run modules on a thread pool
    #[arg(long)]
    pub parallel: bool,

    /// Stop starting new modules after this many seconds
    #[arg(long, value_name = "SECS")]
    pub time_budget: Option<u64>,

    /// Only show failures and warnings
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show every finding with recommendations, and info-level logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Resolve a category name. Unlike report routing, the CLI rejects names it
/// does not know.
pub fn parse_category(raw: &str) -> Result<Category, String> {
    Category::parse(raw).ok_or_else(|| {
        let valid: Vec<_> = Category::ALL.iter().map(|c| c.label()).collect();
        format!(
            "unknown category '{}'. Valid categories: {}",
            raw,
            valid.join(", ")
        )
    })
}

impl AuditArgs {
    /// Layer command line selections over a loaded configuration.
    pub fn apply_to(&self, config: &mut AuditConfig) {
        let run = &mut config.run;
        if self.parallel {
            run.parallel = true;
        }
        if let Some(secs) = self.time_budget {
            run.time_budget_secs = Some(secs);
        }
        if !self.only.is_empty() {
            run.only = self.only.clone();
        }
        if !self.categories.is_empty() {
            run.categories = self.categories.clone();
        }
        for id in &self.skip {
            if !run.disabled.contains(id) {
                run.disabled.push(id.clone());
            }
        }
    }
}
