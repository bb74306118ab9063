//! Report sinks.
//!
//! A sink receives the published report: one section per category with
//! tabular rows, plus a summary record. Sections are provisioned for every
//! category, empty or not, and `ensure_section` clears whatever a previous
//! run left in them, so re-publishing to the same target keeps only the
//! latest rows.

pub mod directory;
pub mod memory;

pub use directory::DirectorySink;
pub use memory::MemorySink;

use crate::engine::aggregator::SeverityCounts;
use crate::{AuditRun, Category, Finding, RunMetadata};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sink failures.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The target could not be created or opened
    #[error("cannot open report target {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A section or the summary could not be written
    #[error("cannot write section '{section}': {source}")]
    Write {
        section: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode report data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("unknown section '{0}'")]
    UnknownSection(String),
}

/// Opaque reference to a provisioned section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionHandle {
    name: String,
}

impl SectionHandle {
    pub fn new(name: &str) -> Self {
        SectionHandle {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One tabular report row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub category: String,
    pub item: String,
    pub status: String,
    pub details: String,
    pub recommendation: String,
}

impl From<&Finding> for ReportRow {
    fn from(finding: &Finding) -> Self {
        ReportRow {
            category: finding.category.section().to_string(),
            item: finding.item.clone(),
            status: finding.severity.label().to_string(),
            details: finding.details.clone(),
            recommendation: finding.recommendation.clone(),
        }
    }
}

/// Counts for one summary line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub section: String,
    pub counts: SeverityCounts,
}

/// Summary record written once per publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub metadata: RunMetadata,
    pub totals: SeverityCounts,
    pub categories: Vec<CategorySummary>,
    pub critical: Vec<ReportRow>,
}

impl SummaryRecord {
    pub fn from_run(run: &AuditRun) -> Self {
        SummaryRecord {
            metadata: run.metadata.clone(),
            totals: run.report.totals,
            categories: run
                .report
                .sections
                .iter()
                .map(|s| CategorySummary {
                    category: s.category,
                    section: s.section.clone(),
                    counts: s.counts,
                })
                .collect(),
            critical: run.report.critical.iter().map(ReportRow::from).collect(),
        }
    }
}

/// Write side of a report target.
pub trait ReportSink {
    /// Provision a section, clearing any rows it already holds.
    fn ensure_section(&mut self, name: &str) -> Result<SectionHandle, SinkError>;

    fn append_rows(&mut self, section: &SectionHandle, rows: &[ReportRow]) -> Result<(), SinkError>;

    fn write_summary(&mut self, summary: &SummaryRecord) -> Result<(), SinkError>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn ensure_section(&mut self, name: &str) -> Result<SectionHandle, SinkError> {
        (**self).ensure_section(name)
    }

    fn append_rows(
        &mut self,
        section: &SectionHandle,
        rows: &[ReportRow],
    ) -> Result<(), SinkError> {
        (**self).append_rows(section, rows)
    }

    fn write_summary(&mut self, summary: &SummaryRecord) -> Result<(), SinkError> {
        (**self).write_summary(summary)
    }
}

/// Publish a completed run: every section is provisioned in priority
/// order, its rows appended, then the summary is written.
pub fn publish<S: ReportSink + ?Sized>(run: &AuditRun, sink: &mut S) -> Result<(), SinkError> {
    for section in &run.report.sections {
        let handle = sink.ensure_section(&section.section)?;
        if !section.findings.is_empty() {
            let rows: Vec<ReportRow> = section.findings.iter().map(ReportRow::from).collect();
            sink.append_rows(&handle, &rows)?;
        }
    }
    sink.write_summary(&SummaryRecord::from_run(run))?;
    tracing::debug!(sections = run.report.sections.len(), "report published");
    Ok(())
}
