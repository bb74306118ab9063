//! Full run integration tests.
//!
//! Tests for complete audit runs, including orchestration, failure
//! containment, time budgets, and result aggregation.

use crate::mocks::{audit, audit_only, findings_of, MockCampaign, MockSource};
use campaign_audit::config::AuditConfig;
use campaign_audit::engine::aggregator::aggregate;
use campaign_audit::engine::orchestrator::{
    create_all_modules, AuditContext, AuditOrchestrator, OrchestratorConfig, RegisteredModule,
};
use campaign_audit::source::AccessError;
use campaign_audit::{AuditError, Category, Finding, Recorder, Severity};
use std::collections::HashSet;
use std::sync::atomic::Ordering;

// Helper to register a test module
fn test_module(
    id: &str,
    run: impl Fn(&AuditContext<'_>, &mut Recorder) -> Result<(), AuditError>
        + Send
        + Sync
        + 'static,
) -> RegisteredModule {
    RegisteredModule {
        id: id.to_string(),
        name: format!("Test module {}", id),
        category: Category::Targeting,
        description: "Test module".to_string(),
        run: Box::new(run),
    }
}

fn passing(id: &str) -> RegisteredModule {
    test_module(id, |_, rec| {
        rec.pass(Category::Targeting, "Always passes", "fine");
        Ok(())
    })
}

fn two_campaign_source() -> MockSource {
    MockSource::healthy().with_campaign(MockCampaign::healthy("c2", "US-Generic-Search", 2))
}

/// An account with a handful of problems spread over several modules.
fn messy_source() -> MockSource {
    let mut weak = MockCampaign::healthy("c2", "summer_sale", 1);
    weak.negatives.clear();
    weak.stats.conversions = 0.0;
    weak.ad_groups[0].ads[0].final_urls = vec!["http://shop.example/sale".to_string()];

    let mut broad = MockCampaign::healthy("c3", "UK-Generic-Search", 3);
    broad.networks.search_partners = true;
    broad.budget.daily_amount = 0.0;

    MockSource::healthy().with_campaign(weak).with_campaign(broad)
}

fn outside(findings: impl Iterator<Item = Finding>, module: &str) -> Vec<Finding> {
    findings.filter(|f| f.module != module).collect()
}

#[test]
fn test_healthy_account_is_clean() {
    let run = audit(&MockSource::healthy(), &AuditConfig::default());

    assert_eq!(run.report.totals.fail, 0);
    assert_eq!(run.report.totals.warn, 0);
    assert_eq!(run.report.totals.error, 0);
    assert_eq!(run.report.totals.skipped, 0);
    // Account settings observation plus three manual review items
    assert_eq!(run.report.totals.info, 4);
    assert_eq!(run.exit_code(), 0);
    assert_eq!(run.metadata.modules_run, create_all_modules().len());
    assert_eq!(run.metadata.account_name.as_deref(), Some("Example Outfitters"));
    assert!(!run.metadata.terminated_early);
}

#[test]
fn test_no_finding_lands_in_fallback_category() {
    let run = audit(&messy_source(), &AuditConfig::default());
    assert!(run.report.findings().all(|f| f.category != Category::ManualReview));
    assert!(run
        .report
        .section(Category::ManualReview)
        .unwrap()
        .findings
        .is_empty());
}

#[test]
fn test_aggregation_is_consistent() {
    let run = audit(&messy_source(), &AuditConfig::default());
    let report = &run.report;

    assert!(report.totals.fail > 0);
    assert_eq!(report.critical.len() as u32, report.totals.fail);
    assert!(report.critical.iter().all(|f| f.severity == Severity::Fail));
    assert_eq!(report.totals.total() as usize, report.findings().count());

    let summed = report.sections.iter().fold(0, |acc, s| acc + s.counts.total());
    assert_eq!(summed, report.totals.total());
    assert_eq!(run.exit_code(), 1);
}

#[test]
fn test_warnings_only_exit_code() {
    let mut campaign = MockCampaign::healthy("c1", "US-Brand-Search", 2);
    campaign.negatives.clear();
    let run = audit(&MockSource::empty().with_campaign(campaign), &AuditConfig::default());

    assert_eq!(run.report.totals.fail, 0);
    assert!(run.report.totals.warn > 0);
    assert_eq!(run.exit_code(), 2);
}

#[test]
fn test_single_failed_read_is_contained() {
    let baseline = audit(&two_campaign_source(), &AuditConfig::default());
    let degraded = audit(&two_campaign_source().fail("budget", "c2"), &AuditConfig::default());

    // Everything outside the budget module is untouched
    assert_eq!(
        outside(baseline.report.findings().cloned(), "BUD-001"),
        outside(degraded.report.findings().cloned(), "BUD-001")
    );

    let budget = findings_of(&degraded, "BUD-001");
    let errors: Vec<_> = budget.iter().filter(|f| f.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].item, "Daily budget set");
    assert!(errors[0].details.contains("US-Generic-Search"));
    assert!(errors[0].details.contains("injected failure"));

    // The other rule of the same module still ran for the same campaign
    assert!(budget.iter().any(|f| f.item == "Impression share lost to budget"
        && f.severity == Severity::Pass
        && f.details.contains("US-Generic-Search")));
    assert_eq!(budget.len(), findings_of(&baseline, "BUD-001").len());
    assert_eq!(degraded.report.totals.error, 1);
}

#[test]
fn test_failed_campaign_listing_yields_one_error_per_module() {
    let run = audit(&MockSource::healthy().fail_campaign_listing(), &AuditConfig::default());
    let account_only: HashSet<&str> =
        ["TRK-001", "TRK-002", "ACC-001", "MAN-001"].into_iter().collect();

    for module in create_all_modules() {
        let findings = findings_of(&run, &module.id);
        if account_only.contains(module.id.as_str()) {
            assert!(findings.iter().all(|f| f.severity != Severity::Error), "{}", module.id);
        } else {
            assert_eq!(findings.len(), 1, "{}", module.id);
            assert_eq!(findings[0].severity, Severity::Error);
            assert!(findings[0].details.contains("listing timed out"));
        }
    }
    assert_eq!(run.report.totals.error as usize, create_all_modules().len() - account_only.len());
}

#[test]
fn test_module_error_and_panic_are_contained() {
    let mut orchestrator = AuditOrchestrator::new(OrchestratorConfig::default());
    orchestrator.register_module(test_module("T-001", |_, rec| {
        rec.pass(Category::Targeting, "Recorded first", "kept");
        Err(AuditError::Data(AccessError::unavailable("campaigns", "gave up")))
    }));
    orchestrator.register_module(test_module("T-002", |_, _| panic!("boom")));
    orchestrator.register_module(passing("T-003"));

    let source = MockSource::healthy();
    let outcome = orchestrator.run(&source, &AuditConfig::default());
    let report = aggregate(&outcome.collector);
    let by_module = |id: &str| -> Vec<Finding> {
        report
            .findings()
            .filter(|f| f.module == id)
            .cloned()
            .collect()
    };

    let first = by_module("T-001");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].severity, Severity::Pass);
    assert_eq!(first[1].severity, Severity::Error);
    assert!(first[1].details.contains("gave up"));
    assert!(first[1].details.contains("Findings recorded before the failure are kept"));

    let second = by_module("T-002");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].severity, Severity::Error);
    assert!(second[0].details.contains("panicked: boom"));

    let third = by_module("T-003");
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].severity, Severity::Pass);

    assert_eq!(outcome.modules_run, 3);
    assert_eq!(outcome.modules_skipped, 0);
}

#[test]
fn test_cancellation_skips_remaining_modules() {
    let mut orchestrator = AuditOrchestrator::new(OrchestratorConfig::default());
    let cancel = orchestrator.cancel_handle();
    orchestrator.register_module(test_module("T-001", move |_, rec| {
        rec.pass(Category::Targeting, "Runs", "ran");
        cancel.store(true, Ordering::SeqCst);
        Ok(())
    }));
    orchestrator.register_module(passing("T-002"));
    orchestrator.register_module(passing("T-003"));

    let source = MockSource::healthy();
    let outcome = orchestrator.run(&source, &AuditConfig::default());
    let report = aggregate(&outcome.collector);

    assert_eq!(outcome.modules_run, 1);
    assert_eq!(outcome.modules_skipped, 2);
    assert!(outcome.terminated_early);
    let skipped: Vec<_> = report
        .findings()
        .filter(|f| f.severity == Severity::Skipped)
        .map(|f| f.module.as_str())
        .collect();
    assert_eq!(skipped, vec!["T-002", "T-003"]);
}

#[test]
fn test_exhausted_time_budget_skips_everything() {
    let mut config = AuditConfig::default();
    config.run.time_budget_secs = Some(0);
    let run = audit(&MockSource::healthy(), &config);

    let modules = create_all_modules().len();
    assert!(run.metadata.terminated_early);
    assert_eq!(run.metadata.modules_run, 0);
    assert_eq!(run.metadata.modules_skipped, modules);
    assert_eq!(run.report.totals.skipped as usize, modules);
    assert!(run
        .report
        .findings()
        .all(|f| f.details.contains("time budget was exhausted")));
}

#[test]
fn test_disabled_module_is_reported_skipped() {
    let mut config = AuditConfig::default();
    config.run.disabled = vec!["KW-003".to_string()];
    let run = audit(&MockSource::healthy(), &config);

    let findings = findings_of(&run, "KW-003");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Skipped);
    assert!(findings[0].details.contains("disabled by configuration"));
    assert_eq!(run.metadata.modules_skipped, 1);
    assert!(!run.metadata.terminated_early);
    assert_eq!(run.exit_code(), 0);
}

#[test]
fn test_parallel_run_matches_sequential() {
    let source = messy_source();
    let sequential = audit(&source, &AuditConfig::default());

    let mut config = AuditConfig::default();
    config.run.parallel = true;
    config.run.max_parallel = 3;
    let parallel = audit(&source, &config);

    assert_eq!(sequential.report, parallel.report);
    assert_eq!(sequential.metadata.modules_run, parallel.metadata.modules_run);
}

#[test]
fn test_only_selection() {
    let run = audit_only(&MockSource::healthy(), &["STR-001", "NAM-001"]);
    assert_eq!(run.metadata.modules_run, 2);
    assert!(run
        .report
        .findings()
        .all(|f| f.module == "STR-001" || f.module == "NAM-001"));
}

#[test]
fn test_category_selection() {
    let mut config = AuditConfig::default();
    config.run.categories = vec![Category::Keywords];
    let run = audit(&MockSource::healthy(), &config);

    assert_eq!(run.metadata.modules_run, 3);
    assert!(run.report.findings().all(|f| f.category == Category::Keywords));
}

#[test]
fn test_empty_account_rolls_up_to_info() {
    let run = audit(&MockSource::empty(), &AuditConfig::default());

    assert_eq!(run.report.totals.fail, 0);
    assert_eq!(run.report.totals.error, 0);
    let rollups: Vec<_> = run
        .report
        .findings()
        .filter(|f| f.item.ends_with("(summary)") && f.module != "TRK-002")
        .collect();
    assert!(!rollups.is_empty());
    for rollup in rollups {
        assert_eq!(rollup.severity, Severity::Info, "{}", rollup.item);
        assert!(rollup.details.starts_with("No "), "{}", rollup.details);
    }
}
