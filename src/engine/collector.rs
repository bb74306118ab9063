//! Finding collection.
//!
//! A [`Recorder`] buffers the findings of one module invocation; the
//! [`ResultCollector`] owns the per-category buckets and the critical digest
//! for the lifetime of one run. Both are append-only and recording never fails.

use crate::source::AccessError;
use crate::{Category, Finding, Severity};
use std::collections::BTreeMap;

/// Per-module finding buffer handed to every check module.
#[derive(Debug)]
pub struct Recorder {
    module: String,
    findings: Vec<Finding>,
}

impl Recorder {
    pub fn new(module: &str) -> Self {
        Recorder {
            module: module.to_string(),
            findings: Vec::new(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Record one evaluated rule.
    pub fn record(
        &mut self,
        category: Category,
        item: impl Into<String>,
        severity: Severity,
        details: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        let finding = Finding {
            module: self.module.clone(),
            category,
            item: item.into(),
            severity,
            details: details.into(),
            recommendation: recommendation.into(),
        };

        tracing::debug!(
            module = %finding.module,
            category = finding.category.label(),
            severity = %finding.severity,
            item = %finding.item,
            "{}",
            finding.details
        );

        self.findings.push(finding);
    }

    /// Record with a free-text category label. Unknown labels go to the
    /// fallback category.
    pub fn record_labeled(
        &mut self,
        label: &str,
        item: impl Into<String>,
        severity: Severity,
        details: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        self.record(Category::from_label(label), item, severity, details, recommendation);
    }

    pub fn pass(
        &mut self,
        category: Category,
        item: impl Into<String>,
        details: impl Into<String>,
    ) {
        self.record(category, item, Severity::Pass, details, "N/A");
    }

    /// Record a failed accessor read for one subject.
    ///
    /// Unsupported capabilities are a known limitation (Info); everything
    /// else is a data-access problem (Error).
    pub fn unavailable(
        &mut self,
        category: Category,
        item: impl Into<String>,
        subject: &str,
        err: &AccessError,
    ) {
        tracing::warn!(module = %self.module, subject, error = %err, "data unavailable");
        match err {
            AccessError::Unsupported { attribute } => self.record(
                category,
                item,
                Severity::Info,
                format!("{} for {} cannot be read from this data source.", attribute, subject),
                format!("Check the {} of {} manually.", attribute, subject),
            ),
            AccessError::Unavailable { attribute, reason } => self.record(
                category,
                item,
                Severity::Error,
                format!("Could not read {} for {}: {}.", attribute, subject, reason),
                format!(
                    "Re-run the audit; if this persists, verify data access for {} of {}.",
                    attribute,
                    subject
                ),
            ),
        }
    }

    /// Record a checklist item that automated inspection cannot verify.
    pub fn manual(
        &mut self,
        category: Category,
        item: impl Into<String>,
        what: &str,
        location: &str,
    ) {
        self.record(
            category,
            item,
            Severity::Info,
            format!("Manual review required: {}.", what),
            format!("Review in {}.", location),
        );
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Run-scoped finding store: category buckets plus the critical digest.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultCollector {
    buckets: BTreeMap<Category, Vec<Finding>>,
    critical: Vec<Finding>,
    recorded: usize,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding to its category bucket, and to the critical digest
    /// when it is a failure.
    pub fn record(&mut self, finding: Finding) {
        if finding.severity == Severity::Fail {
            self.critical.push(finding.clone());
        }
        self.buckets.entry(finding.category).or_default().push(finding);
        self.recorded += 1;
    }

    /// Append everything a module recorded, preserving its order.
    pub fn absorb(&mut self, recorder: Recorder) {
        for finding in recorder.into_findings() {
            self.record(finding);
        }
    }

    /// Findings of one category in emission order.
    pub fn bucket(&self, category: Category) -> &[Finding] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All Fail findings in emission order.
    pub fn critical(&self) -> &[Finding] {
        &self.critical
    }

    pub fn len(&self) -> usize {
        self.recorded
    }

    pub fn is_empty(&self) -> bool {
        self.recorded == 0
    }
}
