//! campaign-audit library
//!
//! Read-only best-practice audit for advertising accounts.
//!
//! This library provides:
//! - A data-source capability interface over the account → campaign →
//!   ad group → keyword/ad hierarchy
//! - A library of check modules grouped by functional area
//! - Result collection, category routing and aggregation into a run report
//! - Report sinks (in-memory and directory) plus terminal, JSON and JUnit output
//!
//! # Example
//!
//! ```no_run
//! use campaign_audit::config::AuditConfig;
//! use campaign_audit::sink::MemorySink;
//! use campaign_audit::source::SnapshotSource;
//! use campaign_audit::run_audit;
//!
//! let source = SnapshotSource::from_path("account.json").expect("snapshot");
//! let config = AuditConfig::default();
//! let output = run_audit(&source, || Ok(MemorySink::new()), &config).expect("audit");
//! println!("Fails: {}", output.run.report.totals.fail);
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod sink;
pub mod source;
pub mod version;

use config::AuditConfig;
use engine::aggregator::{aggregate, RunReport};
use engine::orchestrator::{create_all_modules, AuditOrchestrator, OrchestratorConfig};
use serde::{Deserialize, Serialize};
use sink::{ReportSink, SinkError};
use source::DataSource;
use std::fmt;
use std::time::Instant;

// Re-exports for public API
pub use engine::collector::{Recorder, ResultCollector};

/// Outcome of one evaluated rule.
///
/// Ordered by declaration only; use [`Severity::urgency`] when ranking
/// findings for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Verified compliant state
    Pass,
    /// Definite best-practice violation
    Fail,
    /// Probable violation
    Warn,
    /// Neutral observation or manual review item
    Info,
    /// Check could not complete because data was unavailable
    Error,
    /// Check disabled by configuration or not run
    Skipped,
}

impl Severity {
    /// Review urgency: lower is more urgent.
    pub fn urgency(self) -> u8 {
        match self {
            Severity::Fail => 0,
            Severity::Warn => 1,
            Severity::Error => 2,
            Severity::Info | Severity::Skipped | Severity::Pass => 3,
        }
    }

    /// Upper-case status label used in report rows.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Pass => "PASS",
            Severity::Fail => "FAIL",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
            Severity::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Functional area a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Auto-tagging and conversion actions
    ConversionTracking,
    /// Budgets and bid strategies
    BudgetBidding,
    /// CTR, CPA and impression share
    Performance,
    /// Keyword quality, match types and duplicates
    Keywords,
    /// Ad approval and strength
    Ads,
    /// Counts of ad groups, keywords and ads
    CampaignStructure,
    /// Networks, locations, negatives and schedules
    Targeting,
    /// Sitelinks, callouts and structured snippets
    Extensions,
    /// Final URLs
    LandingPages,
    /// Account-level observations
    AccountSettings,
    /// Campaign and ad group naming
    Naming,
    /// Audience configuration (manual review)
    Audiences,
    /// Fallback for anything the router does not know
    ManualReview,
}

impl Category {
    /// Every category, in summary priority order. The fallback is last.
    pub const ALL: [Category; 13] = [
        Category::ConversionTracking,
        Category::BudgetBidding,
        Category::Performance,
        Category::Keywords,
        Category::Ads,
        Category::CampaignStructure,
        Category::Targeting,
        Category::Extensions,
        Category::LandingPages,
        Category::AccountSettings,
        Category::Naming,
        Category::Audiences,
        Category::ManualReview,
    ];

    /// Stable machine label (matches the serde representation).
    pub fn label(self) -> &'static str {
        match self {
            Category::ConversionTracking => "conversion_tracking",
            Category::BudgetBidding => "budget_bidding",
            Category::Performance => "performance",
            Category::Keywords => "keywords",
            Category::Ads => "ads",
            Category::CampaignStructure => "campaign_structure",
            Category::Targeting => "targeting",
            Category::Extensions => "extensions",
            Category::LandingPages => "landing_pages",
            Category::AccountSettings => "account_settings",
            Category::Naming => "naming",
            Category::Audiences => "audiences",
            Category::ManualReview => "manual_review",
        }
    }

    /// Category named by a machine label or a section name, if any.
    pub fn parse(text: &str) -> Option<Category> {
        let label = engine::router::resolve(text)?;
        Category::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Resolve a free-text label. Unknown labels fall back to `ManualReview`.
    pub fn from_label(label: &str) -> Category {
        Category::parse(label).unwrap_or(Category::ManualReview)
    }

    /// Report section this category renders into.
    pub fn section(self) -> &'static str {
        engine::router::section_for(self.label())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

/// One rule's evaluated outcome for one entity or for an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Id of the module that emitted the finding (e.g. "STR-001")
    pub module: String,
    pub category: Category,
    /// Rule identifier
    pub item: String,
    pub severity: Severity,
    /// Observed state, readable without other context
    pub details: String,
    /// Actionable guidance, "N/A" when nothing is actionable
    pub recommendation: String,
}

/// Error types for campaign-audit operations.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Configuration could not be used
    #[error("configuration error: {0}")]
    Config(String),
    /// A naming pattern failed to compile
    #[error("invalid naming pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
    /// I/O error
    #[error("I/O error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON (de)serialization error
    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    /// TOML parse error
    #[error("TOML error in {context}: {message}")]
    Toml { context: String, message: String },
    /// The report sink could not be opened; nothing was run
    #[error("report sink could not be initialized: {0}")]
    SinkInit(#[source] SinkError),
    /// The report sink failed while publishing a completed report
    #[error("report sink failed: {0}")]
    Sink(#[from] SinkError),
    /// A data-source read failed where no per-entity fallback exists
    #[error("data source error: {0}")]
    Data(#[from] source::AccessError),
}

/// Run metadata kept outside the aggregated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub account_name: Option<String>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
    pub modules_run: usize,
    pub modules_skipped: usize,
    /// True when the time budget or cancellation stopped the run early
    pub terminated_early: bool,
}

/// Complete output of one audit execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRun {
    pub metadata: RunMetadata,
    pub report: RunReport,
}

impl AuditRun {
    /// Process exit code for this run: 1 on failures, 2 on warnings only.
    pub fn exit_code(&self) -> u8 {
        if self.report.totals.fail > 0 {
            1
        } else if self.report.totals.warn > 0 {
            2
        } else {
            0
        }
    }
}

/// Result of [`run_audit`]: the run plus the sink it was published to.
pub struct AuditOutput<S> {
    pub run: AuditRun,
    pub sink: S,
}

/// Run the full audit.
///
/// The sink is opened first; if that fails the run aborts before any module
/// executes. Every selected module then runs in declared order, findings are
/// aggregated, and the report is published to the sink.
pub fn run_audit<S, F>(
    source: &dyn DataSource,
    open_sink: F,
    config: &AuditConfig,
) -> Result<AuditOutput<S>, AuditError>
where
    S: ReportSink,
    F: FnOnce() -> Result<S, SinkError>,
{
    let mut sink = open_sink().map_err(AuditError::SinkInit)?;

    let start = Instant::now();
    let mut orchestrator =
        AuditOrchestrator::new(OrchestratorConfig::from_run_settings(&config.run));
    orchestrator.register_modules(create_all_modules());

    let outcome = orchestrator.run(source, config);
    let report = aggregate(&outcome.collector);

    let account_name = source.account_info().ok().map(|info| info.name);
    let run = AuditRun {
        metadata: RunMetadata {
            account_name,
            generated_at: chrono::Utc::now(),
            duration_ms: start.elapsed().as_millis() as u64,
            modules_run: outcome.modules_run,
            modules_skipped: outcome.modules_skipped,
            terminated_early: outcome.terminated_early,
        },
        report,
    };

    sink::publish(&run, &mut sink)?;
    tracing::info!(
        fails = run.report.totals.fail,
        warns = run.report.totals.warn,
        "audit complete"
    );

    Ok(AuditOutput { run, sink })
}
