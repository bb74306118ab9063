//! Check module orchestrator.
//!
//! Manages module registration, selection and execution.
//!
//! # Graceful Degradation
//!
//! This module handles errors gracefully:
//! - Module panics: caught via std::panic::catch_unwind, recorded as one Error finding
//! - Module errors: an `Err` escaping a module is recorded as one Error finding
//! - Findings recorded before a module failed are kept
//! - Disabled modules: one Skipped finding each
//! - Time budget or cancellation: the running module finishes, every
//!   remaining module gets one Skipped finding
//! - Thread pool unavailable: falls back to sequential execution
//!
//! Modules always run in declared order. In parallel mode each module still
//! records into its own buffer and buffers are merged in declared order, so
//! the collector contents match a sequential run.

use crate::checks::{
    ads, budget, extensions, keywords, landing, manual, naming, performance, structure, targeting,
    tracking,
};
use crate::config::{AuditConfig, NamingRules, RunSettings, Thresholds};
use crate::engine::collector::{Recorder, ResultCollector};
use crate::engine::pacing::Pacing;
use crate::source::DataSource;
use crate::{AuditError, Category, Severity};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a check module reads. All of it is read-only.
pub struct AuditContext<'a> {
    pub source: &'a dyn DataSource,
    pub thresholds: &'a Thresholds,
    pub naming: &'a NamingRules,
    pub pacing: Pacing,
}

/// Signature shared by every check module.
pub type ModuleFn =
    Box<dyn Fn(&AuditContext<'_>, &mut Recorder) -> Result<(), AuditError> + Send + Sync>;

/// A registered module with its execution function
pub struct RegisteredModule {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    pub run: ModuleFn,
}

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub parallel: bool,
    pub max_parallel: usize,
    pub time_budget: Option<Duration>,
    pub only: Vec<String>,
    pub categories: Vec<Category>,
    pub disabled: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            parallel: false,
            max_parallel: 4,
            time_budget: None,
            only: Vec::new(),
            categories: Vec::new(),
            disabled: Vec::new(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_run_settings(run: &RunSettings) -> Self {
        OrchestratorConfig {
            parallel: run.parallel,
            max_parallel: run.max_parallel.max(1),
            time_budget: run.time_budget_secs.map(Duration::from_secs),
            only: run.only.clone(),
            categories: run.categories.clone(),
            disabled: run.disabled.clone(),
        }
    }
}

/// What happened to one selected module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleStatus {
    Ran,
    Disabled,
    OutOfTime,
}

/// Collector plus bookkeeping for one run.
#[derive(Debug)]
pub struct RunOutcome {
    pub collector: ResultCollector,
    pub modules_run: usize,
    pub modules_skipped: usize,
    pub terminated_early: bool,
}

/// Module orchestrator
pub struct AuditOrchestrator {
    config: OrchestratorConfig,
    modules: Vec<RegisteredModule>,
    cancel: Arc<AtomicBool>,
}

impl AuditOrchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        AuditOrchestrator {
            config,
            modules: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register modules for execution, in declared order
    pub fn register_modules(&mut self, modules: Vec<RegisteredModule>) {
        self.modules.extend(modules);
    }

    /// Register a single module
    pub fn register_module(&mut self, module: RegisteredModule) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[RegisteredModule] {
        &self.modules
    }

    /// Flag that stops the run before the next module starts.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run every selected module and collect its findings.
    pub fn run(&self, source: &dyn DataSource, config: &AuditConfig) -> RunOutcome {
        let ctx = AuditContext {
            source,
            thresholds: &config.thresholds,
            naming: &config.naming,
            pacing: config.run.pacing,
        };
        self.run_with(&ctx)
    }

    /// Run every selected module against an already-built context.
    pub fn run_with(&self, ctx: &AuditContext<'_>) -> RunOutcome {
        let start = Instant::now();
        let selected = self.selected();
        tracing::info!(
            modules = selected.len(),
            parallel = self.config.parallel,
            "starting audit run"
        );

        let results = if self.config.parallel {
            self.run_parallel(&selected, ctx, start)
        } else {
            self.run_sequential(&selected, ctx, start)
        };

        let mut outcome = RunOutcome {
            collector: ResultCollector::new(),
            modules_run: 0,
            modules_skipped: 0,
            terminated_early: false,
        };
        for (status, recorder) in results {
            match status {
                ModuleStatus::Ran => outcome.modules_run += 1,
                ModuleStatus::Disabled => outcome.modules_skipped += 1,
                ModuleStatus::OutOfTime => {
                    outcome.modules_skipped += 1;
                    outcome.terminated_early = true;
                }
            }
            outcome.collector.absorb(recorder);
        }

        tracing::info!(
            run = outcome.modules_run,
            skipped = outcome.modules_skipped,
            findings = outcome.collector.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "audit run finished"
        );
        outcome
    }

    /// Modules that pass the only/category filters, in declared order.
    fn selected(&self) -> Vec<&RegisteredModule> {
        self.modules
            .iter()
            .filter(|m| self.config.only.is_empty() || self.config.only.contains(&m.id))
            .filter(|m| {
                self.config.categories.is_empty() || self.config.categories.contains(&m.category)
            })
            .collect()
    }

    /// Run modules sequentially
    fn run_sequential(
        &self,
        modules: &[&RegisteredModule],
        ctx: &AuditContext<'_>,
        start: Instant,
    ) -> Vec<(ModuleStatus, Recorder)> {
        modules.iter().map(|m| self.invoke(m, ctx, start)).collect()
    }

    /// Run modules on a bounded thread pool
    fn run_parallel(
        &self,
        modules: &[&RegisteredModule],
        ctx: &AuditContext<'_>,
        start: Instant,
    ) -> Vec<(ModuleStatus, Recorder)> {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_parallel)
            .build()
        {
            Ok(pool) => pool.install(|| {
                modules
                    .par_iter()
                    .map(|m| self.invoke(m, ctx, start))
                    .collect()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "thread pool unavailable, running sequentially");
                self.run_sequential(modules, ctx, start)
            }
        }
    }

    fn out_of_time(&self, start: Instant) -> bool {
        self.cancel.load(Ordering::Relaxed)
            || self
                .config
                .time_budget
                .is_some_and(|budget| start.elapsed() >= budget)
    }

    /// Decide whether a module runs, then run it.
    fn invoke(
        &self,
        module: &RegisteredModule,
        ctx: &AuditContext<'_>,
        start: Instant,
    ) -> (ModuleStatus, Recorder) {
        let mut recorder = Recorder::new(&module.id);

        if self.config.disabled.contains(&module.id) {
            recorder.record(
                module.category,
                &module.name,
                Severity::Skipped,
                format!("{} ({}) is disabled by configuration.", module.name, module.id),
                "N/A",
            );
            return (ModuleStatus::Disabled, recorder);
        }

        if self.out_of_time(start) {
            tracing::warn!(module = %module.id, "skipping module: time budget exhausted");
            recorder.record(
                module.category,
                &module.name,
                Severity::Skipped,
                format!(
                    "{} ({}) was not run because the audit time budget was exhausted.",
                    module.name,
                    module.id
                ),
                "Re-run with a larger time budget or a narrower module selection.",
            );
            return (ModuleStatus::OutOfTime, recorder);
        }

        self.execute_module(module, ctx, &mut recorder);
        (ModuleStatus::Ran, recorder)
    }

    /// Execute a single module, containing any failure that escapes it
    fn execute_module(
        &self,
        module: &RegisteredModule,
        ctx: &AuditContext<'_>,
        recorder: &mut Recorder,
    ) {
        let started = Instant::now();
        tracing::info!(module = %module.id, name = %module.name, "module started");

        let result = panic::catch_unwind(AssertUnwindSafe(|| (module.run)(ctx, &mut *recorder)));

        let failure = match result {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
        };

        if let Some(reason) = failure {
            tracing::warn!(module = %module.id, %reason, "module failed");
            recorder.record(
                module.category,
                &module.name,
                Severity::Error,
                format!(
                    "{} ({}) stopped before completing: {}. Findings recorded before the failure are kept.",
                    module.name,
                    module.id,
                    reason
                ),
                format!(
                    "Re-run the audit; if this persists, review the {} area manually.",
                    module.category
                ),
            );
        }

        tracing::info!(
            module = %module.id,
            findings = recorder.findings().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "module finished"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn module(
    id: &str,
    name: &str,
    category: Category,
    description: &str,
    run: fn(&AuditContext<'_>, &mut Recorder) -> Result<(), AuditError>,
) -> RegisteredModule {
    RegisteredModule {
        id: id.to_string(),
        name: name.to_string(),
        category,
        description: description.to_string(),
        run: Box::new(run),
    }
}

/// Create all registered modules, in execution order
pub fn create_all_modules() -> Vec<RegisteredModule> {
    vec![
        // Conversion tracking
        module(
            "TRK-001",
            "Auto-tagging",
            Category::ConversionTracking,
            "Verify auto-tagging is enabled for the account",
            tracking::audit_auto_tagging,
        ),
        module(
            "TRK-002",
            "Conversion actions",
            Category::ConversionTracking,
            "Verify enabled conversion actions exist and are recording conversions",
            tracking::audit_conversion_actions,
        ),
        module(
            "ACC-001",
            "Account settings",
            Category::AccountSettings,
            "Record account identity, currency and time zone",
            tracking::audit_account_settings,
        ),
        // Structure
        module(
            "STR-001",
            "Active ad groups per campaign",
            Category::CampaignStructure,
            "Check each campaign has an acceptable number of active ad groups",
            structure::audit_ad_group_counts,
        ),
        module(
            "STR-002",
            "Keywords per ad group",
            Category::CampaignStructure,
            "Check each ad group has an acceptable number of active keywords",
            structure::audit_keyword_counts,
        ),
        module(
            "STR-003",
            "Ads per ad group",
            Category::CampaignStructure,
            "Check each ad group has enough enabled ads",
            structure::audit_ad_counts,
        ),
        // Naming
        module(
            "NAM-001",
            "Campaign naming",
            Category::Naming,
            "Check campaign names against the naming convention",
            naming::audit_campaign_names,
        ),
        module(
            "NAM-002",
            "Ad group naming",
            Category::Naming,
            "Check ad group names against the naming convention",
            naming::audit_ad_group_names,
        ),
        // Budget and bidding
        module(
            "BUD-001",
            "Budget health",
            Category::BudgetBidding,
            "Check budgets are set and not limiting delivery",
            budget::audit_budgets,
        ),
        module(
            "BUD-002",
            "Bidding strategy",
            Category::BudgetBidding,
            "Check campaigns use automated bidding",
            budget::audit_bidding,
        ),
        // Targeting
        module(
            "TGT-001",
            "Network settings",
            Category::Targeting,
            "Check search campaigns are not extended to partner or display networks",
            targeting::audit_networks,
        ),
        module(
            "TGT-002",
            "Location targeting",
            Category::Targeting,
            "Check campaigns target locations by presence",
            targeting::audit_locations,
        ),
        module(
            "TGT-003",
            "Negative keywords",
            Category::Targeting,
            "Check campaigns carry negative keywords",
            targeting::audit_negatives,
        ),
        module(
            "TGT-004",
            "Ad schedule",
            Category::Targeting,
            "Record whether campaigns run on an ad schedule",
            targeting::audit_schedules,
        ),
        // Keywords
        module(
            "KW-001",
            "Quality score",
            Category::Keywords,
            "Check keyword quality scores against the minimum",
            keywords::audit_quality_scores,
        ),
        module(
            "KW-002",
            "Match type mix",
            Category::Keywords,
            "Check broad match share on manually bid campaigns",
            keywords::audit_match_types,
        ),
        module(
            "KW-003",
            "Duplicate keywords",
            Category::Keywords,
            "Find keywords repeated across ad groups of one campaign",
            keywords::audit_duplicates,
        ),
        // Ads
        module(
            "AD-001",
            "Ad approval",
            Category::Ads,
            "Check ads are approved for serving",
            ads::audit_approval,
        ),
        module(
            "AD-002",
            "Ad strength",
            Category::Ads,
            "Check responsive search ad strength",
            ads::audit_strength,
        ),
        // Extensions and landing pages
        module(
            "EXT-001",
            "Extensions",
            Category::Extensions,
            "Check sitelink, callout and structured snippet coverage",
            extensions::audit_extensions,
        ),
        module(
            "LP-001",
            "Landing pages",
            Category::LandingPages,
            "Check ads have secure final URLs",
            landing::audit_final_urls,
        ),
        // Performance
        module(
            "PERF-001",
            "Campaign efficiency",
            Category::Performance,
            "Check CTR, cost per conversion and impression share lost to rank",
            performance::audit_efficiency,
        ),
        // Manual review
        module(
            "MAN-001",
            "Manual review items",
            Category::Audiences,
            "List checklist items that need a human reviewer",
            manual::audit_manual_items,
        ),
    ]
}
