//! campaign-audit CLI entry point
//!
//! Read-only best-practice audit for advertising accounts.

use campaign_audit::cli::args::{AuditArgs, Cli, Commands};
use campaign_audit::cli::output::get_formatter;
use campaign_audit::config::{load_config, AuditConfig};
use campaign_audit::engine::orchestrator::create_all_modules;
use campaign_audit::sink::{DirectorySink, MemorySink};
use campaign_audit::source::SnapshotSource;
use campaign_audit::version::get_build_info;
use campaign_audit::{run_audit, AuditError, AuditRun, Category};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const RUNTIME_ERROR: u8 = 3;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("{}", get_build_info());
            ExitCode::SUCCESS
        }
        Commands::List => {
            print_module_list();
            ExitCode::SUCCESS
        }
        Commands::Audit(args) => {
            init_tracing(args.verbose);
            match audit(&args) {
                Ok(run) => ExitCode::from(run.exit_code()),
                Err(e) => {
                    tracing::error!(error = %e, "audit failed");
                    eprintln!("Error: {}", e);
                    ExitCode::from(RUNTIME_ERROR)
                }
            }
        }
    }
}

/// Logs go to stderr so report output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn audit(args: &AuditArgs) -> Result<AuditRun, AuditError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AuditConfig::default(),
    };
    args.apply_to(&mut config);

    let source = SnapshotSource::from_path(&args.snapshot)?;

    let run = match &args.output_dir {
        Some(dir) => run_audit(&source, || DirectorySink::open(dir), &config)?.run,
        None => run_audit(&source, || Ok(MemorySink::new()), &config)?.run,
    };

    let no_color = args.no_color || std::env::var_os("NO_COLOR").is_some();
    let formatter = get_formatter(args.format, no_color, args.verbose, args.quiet);
    println!("{}", formatter.format(&run));

    Ok(run)
}

fn print_module_list() {
    let modules = create_all_modules();
    println!("Available check modules:");
    for category in Category::ALL {
        let in_category: Vec<_> = modules.iter().filter(|m| m.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        println!();
        println!("{} ({}):", category.section().to_uppercase(), category.label());
        for module in in_category {
            println!("  {:<9}{:<32}{}", module.id, module.name, module.description);
        }
    }
}

