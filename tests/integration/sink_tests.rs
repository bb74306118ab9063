//! Report sink integration tests.
//!
//! Verifies publishing to in-memory and directory sinks, re-publishing to
//! the same target, and how sink failures surface.

use crate::mocks::{MockCampaign, MockSource};
use campaign_audit::config::AuditConfig;
use campaign_audit::sink::directory::SUMMARY_FILE;
use campaign_audit::sink::{
    DirectorySink, MemorySink, ReportRow, ReportSink, SectionHandle, SinkError, SummaryRecord,
};
use campaign_audit::{run_audit, AuditError, Category};
use std::fs;

const NAMING: &str = "Naming Conventions";

fn badly_named() -> MockSource {
    MockSource::healthy().with_campaign(MockCampaign::healthy("c2", "summer_sale", 2))
}

/// Sink that accepts sections but refuses rows.
struct RejectingSink;

impl ReportSink for RejectingSink {
    fn ensure_section(&mut self, name: &str) -> Result<SectionHandle, SinkError> {
        Ok(SectionHandle::new(name))
    }

    fn append_rows(
        &mut self,
        section: &SectionHandle,
        _rows: &[ReportRow],
    ) -> Result<(), SinkError> {
        Err(SinkError::Write {
            section: section.name().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }

    fn write_summary(&mut self, _summary: &SummaryRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

#[test]
fn test_memory_sink_receives_every_section() {
    let output =
        run_audit(&badly_named(), || Ok(MemorySink::new()), &AuditConfig::default()).unwrap();
    let sink = output.sink;

    assert_eq!(sink.section_names().count(), Category::ALL.len());
    for category in Category::ALL {
        assert!(sink.section(category.section()).is_some(), "{}", category.section());
    }
    // The fallback section exists but stays empty
    assert!(sink.section("Manual Review").unwrap().is_empty());

    let naming = sink.section(NAMING).unwrap();
    assert!(naming.iter().all(|row| row.category == NAMING));
    assert!(naming
        .iter()
        .any(|row| row.status == "WARN" && row.details.contains("summer_sale")));

    let summary = sink.summary().unwrap();
    assert_eq!(summary.totals, output.run.report.totals);
    assert_eq!(summary.categories.len(), Category::ALL.len());
    assert_eq!(summary.critical.len(), output.run.report.critical.len());
}

#[test]
fn test_republishing_keeps_only_latest_rows() {
    let mut sink = MemorySink::new();
    let config = AuditConfig::default();

    let target = &mut sink;
    run_audit(&badly_named(), move || Ok(target), &config).unwrap();
    let first = sink.section(NAMING).unwrap().len();

    let target = &mut sink;
    run_audit(&MockSource::healthy(), move || Ok(target), &config).unwrap();
    let rows = sink.section(NAMING).unwrap();

    assert!(rows.len() < first);
    assert!(rows.iter().all(|row| !row.details.contains("summer_sale")));
    assert!(rows.iter().all(|row| row.status != "WARN"));
}

#[test]
fn test_directory_sink_layout_and_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = AuditConfig::default();

    run_audit(&badly_named(), || DirectorySink::open(dir.path()), &config).unwrap();
    let output =
        run_audit(&MockSource::healthy(), || DirectorySink::open(dir.path()), &config).unwrap();

    let naming = fs::read_to_string(output.sink.section_path(NAMING)).unwrap();
    let rows: Vec<ReportRow> = naming
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|row| !row.details.contains("summer_sale")));

    // Empty sections still get a file
    let fallback = fs::read_to_string(output.sink.section_path("Manual Review")).unwrap();
    assert!(fallback.is_empty());

    let summary: SummaryRecord =
        serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(summary.totals, output.run.report.totals);
    assert_eq!(summary.metadata.account_name.as_deref(), Some("Example Outfitters"));
}

#[test]
fn test_sink_init_failure_aborts_before_any_module() {
    let dir = tempfile::tempdir().unwrap();
    let occupied = dir.path().join("report");
    fs::write(&occupied, "not a directory").unwrap();

    let source = MockSource::healthy();
    let result = run_audit(&source, || DirectorySink::open(&occupied), &AuditConfig::default());

    assert!(matches!(result, Err(AuditError::SinkInit(SinkError::Open { .. }))));
    assert_eq!(source.reads(), 0);
}

#[test]
fn test_sink_write_failure_after_run_is_reported() {
    let source = MockSource::healthy();
    let result = run_audit(&source, || Ok(RejectingSink), &AuditConfig::default());

    match result {
        Err(AuditError::Sink(SinkError::Write { section, source: err })) => {
            assert_eq!(section, "Conversion Tracking");
            assert_eq!(err.to_string(), "disk full");
        }
        _ => panic!("expected a sink write error"),
    }
    assert!(source.reads() > 0);
}
