//! In-memory report sink.

use super::{ReportRow, ReportSink, SectionHandle, SinkError, SummaryRecord};
use std::collections::BTreeMap;

/// Keeps sections and the summary in memory. Used for terminal-only runs
/// and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    sections: BTreeMap<String, Vec<ReportRow>>,
    summary: Option<SummaryRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, name: &str) -> Option<&[ReportRow]> {
        self.sections.get(name).map(Vec::as_slice)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn summary(&self) -> Option<&SummaryRecord> {
        self.summary.as_ref()
    }
}

impl ReportSink for MemorySink {
    fn ensure_section(&mut self, name: &str) -> Result<SectionHandle, SinkError> {
        self.sections.insert(name.to_string(), Vec::new());
        Ok(SectionHandle::new(name))
    }

    fn append_rows(
        &mut self,
        section: &SectionHandle,
        rows: &[ReportRow],
    ) -> Result<(), SinkError> {
        self.sections
            .get_mut(section.name())
            .ok_or_else(|| SinkError::UnknownSection(section.name().to_string()))?
            .extend_from_slice(rows);
        Ok(())
    }

    fn write_summary(&mut self, summary: &SummaryRecord) -> Result<(), SinkError> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}
