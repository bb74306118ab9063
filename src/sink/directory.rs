//! Directory report sink.
//!
//! Layout under the target directory:
//! - `<section-slug>.jsonl`: one JSON object per row
//! - `summary.json`: totals, per-category counts, critical digest, metadata

use super::{ReportRow, ReportSink, SectionHandle, SinkError, SummaryRecord};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "summary.json";

/// Writes sections as JSON-lines files in one directory.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create the directory if needed. Failure here is fatal to a run.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SinkError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| SinkError::Open {
            path: root.clone(),
            source,
        })?;
        tracing::debug!(path = %root.display(), "opened report directory");
        Ok(DirectorySink { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing a section.
    pub fn section_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.jsonl", slug(name)))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }
}

/// File-name form of a section label: "Budget & Bidding" -> "budget-bidding".
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn write_error(section: &str) -> impl FnOnce(std::io::Error) -> SinkError + '_ {
    move |source| SinkError::Write {
        section: section.to_string(),
        source,
    }
}

impl ReportSink for DirectorySink {
    fn ensure_section(&mut self, name: &str) -> Result<SectionHandle, SinkError> {
        File::create(self.section_path(name)).map_err(write_error(name))?;
        Ok(SectionHandle::new(name))
    }

    fn append_rows(
        &mut self,
        section: &SectionHandle,
        rows: &[ReportRow],
    ) -> Result<(), SinkError> {
        let path = self.section_path(section.name());
        if !path.exists() {
            return Err(SinkError::UnknownSection(section.name().to_string()));
        }
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(write_error(section.name()))?;
        let mut writer = BufWriter::new(file);
        for row in rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n").map_err(write_error(section.name()))?;
        }
        writer.flush().map_err(write_error(section.name()))?;
        Ok(())
    }

    fn write_summary(&mut self, summary: &SummaryRecord) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(self.summary_path(), json).map_err(write_error("summary"))?;
        Ok(())
    }
}
