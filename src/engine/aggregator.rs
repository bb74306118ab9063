//! Result aggregation.
//!
//! Turns a completed [`ResultCollector`] into a [`RunReport`]: per-category
//! severity counts, account-wide totals and the critical digest. Pure
//! computation over in-memory data; aggregating the same collector twice
//! yields equal reports.

use crate::engine::collector::ResultCollector;
use crate::{Category, Finding, Severity};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub fail: u32,
    pub warn: u32,
    pub error: u32,
    pub info: u32,
    pub pass: u32,
    pub skipped: u32,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Fail => self.fail += 1,
            Severity::Warn => self.warn += 1,
            Severity::Error => self.error += 1,
            Severity::Info => self.info += 1,
            Severity::Pass => self.pass += 1,
            Severity::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.fail + self.warn + self.error + self.info + self.pass + self.skipped
    }

    /// Fails or warnings present.
    pub fn has_issues(&self) -> bool {
        self.fail > 0 || self.warn > 0
    }
}

impl AddAssign for SeverityCounts {
    fn add_assign(&mut self, other: Self) {
        self.fail += other.fail;
        self.warn += other.warn;
        self.error += other.error;
        self.info += other.info;
        self.pass += other.pass;
        self.skipped += other.skipped;
    }
}

/// One report section: a category bucket plus its counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySection {
    pub category: Category,
    /// Section label from the router
    pub section: String,
    pub counts: SeverityCounts,
    pub findings: Vec<Finding>,
}

/// Aggregated output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Every category in priority order, including empty ones
    pub sections: Vec<CategorySection>,
    pub totals: SeverityCounts,
    /// All Fail findings in emission order
    pub critical: Vec<Finding>,
}

impl RunReport {
    /// Sections with at least one Fail or Warn, in priority order.
    pub fn categories_with_issues(&self) -> impl Iterator<Item = &CategorySection> {
        self.sections.iter().filter(|s| s.counts.has_issues())
    }

    pub fn section(&self, category: Category) -> Option<&CategorySection> {
        self.sections.iter().find(|s| s.category == category)
    }

    /// Every finding, section by section.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.sections.iter().flat_map(|s| s.findings.iter())
    }
}

/// Build the run report from a completed collector.
pub fn aggregate(collector: &ResultCollector) -> RunReport {
    let mut totals = SeverityCounts::default();
    let mut sections = Vec::with_capacity(Category::ALL.len());

    for category in Category::ALL {
        let findings = collector.bucket(category);
        let mut counts = SeverityCounts::default();
        for finding in findings {
            counts.add(finding.severity);
        }
        totals += counts;

        sections.push(CategorySection {
            category,
            section: category.section().to_string(),
            counts,
            findings: findings.to_vec(),
        });
    }

    RunReport {
        sections,
        totals,
        critical: collector.critical().to_vec(),
    }
}
