//! Output formatting for campaign-audit.
//!
//! Provides terminal, JSON, and JUnit XML output formatters.
//!
//! # Graceful Degradation
//!
//! - Non-TTY output: color disabled via NO_COLOR or --no-color
//! - Empty reports: every formatter still produces valid output
//! - Unknown account name: rendered as "unknown"
//!
//! All formatters produce valid output for any AuditRun input.

use crate::cli::args::OutputFormat;
use crate::engine::aggregator::CategorySection;
use crate::{AuditRun, Finding, Severity};
use owo_colors::OwoColorize;

const RULE: &str = "--------------------------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a completed run into a string
    fn format(&self, run: &AuditRun) -> String;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
    quiet: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool, quiet: bool) -> Self {
        TerminalFormatter {
            color,
            verbose,
            quiet,
        }
    }

    fn status(&self, severity: Severity) -> String {
        let tag = format!("[{}]", severity.label());
        if !self.color {
            return tag;
        }
        match severity {
            Severity::Pass => tag.green().to_string(),
            Severity::Fail => tag.red().bold().to_string(),
            Severity::Warn => tag.yellow().to_string(),
            Severity::Error => tag.magenta().to_string(),
            Severity::Info => tag.blue().to_string(),
            Severity::Skipped => tag.bright_black().to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn shows(&self, finding: &Finding) -> bool {
        if self.quiet {
            matches!(finding.severity, Severity::Fail | Severity::Warn)
        } else {
            true
        }
    }

    fn push_finding(&self, output: &mut String, finding: &Finding) {
        let module = if self.verbose {
            format!("{} ", finding.module)
        } else {
            String::new()
        };
        output.push_str(&format!(
            "  {} {}{}: {}\n",
            self.status(finding.severity),
            module,
            finding.item,
            finding.details
        ));

        let actionable = matches!(
            finding.severity,
            Severity::Fail | Severity::Warn | Severity::Error
        );
        if (actionable || self.verbose) && finding.recommendation != "N/A" {
            output.push_str(&format!("         -> {}\n", finding.recommendation));
        }
    }

    fn push_section(&self, output: &mut String, section: &CategorySection) {
        if self.quiet && !section.counts.has_issues() {
            return;
        }
        if section.findings.is_empty() {
            return;
        }

        output.push_str(&format!("{}\n", self.heading(&section.section.to_uppercase())));
        // Most urgent first; ties keep emission order
        let mut shown: Vec<&Finding> = section.findings.iter().filter(|f| self.shows(f)).collect();
        shown.sort_by_key(|f| f.severity.urgency());
        for finding in shown {
            self.push_finding(output, finding);
        }
        output.push('\n');
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, run: &AuditRun) -> String {
        let report = &run.report;
        let meta = &run.metadata;
        let mut output = String::new();

        // Header
        output.push_str(RULE);
        output.push('\n');
        output.push_str("campaign-audit report\n");
        output.push_str(&format!(
            "Account: {}\n",
            meta.account_name.as_deref().unwrap_or("unknown")
        ));
        output.push_str(&format!("Generated: {}\n", meta.generated_at.to_rfc3339()));
        output.push_str(RULE);
        output.push_str("\n\n");

        if !report.critical.is_empty() {
            output.push_str(&format!(
                "{}\n",
                self.heading(&format!("CRITICAL ISSUES ({})", report.critical.len()))
            ));
            for finding in &report.critical {
                output.push_str(&format!(
                    "  {} {} / {}: {}\n",
                    self.status(finding.severity),
                    finding.category,
                    finding.item,
                    finding.details
                ));
            }
            output.push('\n');
        }

        for section in &report.sections {
            self.push_section(&mut output, section);
        }

        // Summary
        let totals = &report.totals;
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} failed, {} warnings, {} errors, {} info, {} passed, {} skipped\n",
            totals.fail, totals.warn, totals.error, totals.info, totals.pass, totals.skipped
        ));

        let with_issues: Vec<_> = report
            .categories_with_issues()
            .map(|s| s.section.as_str())
            .collect();
        if !with_issues.is_empty() {
            output.push_str(&format!("Needs attention: {}\n", with_issues.join(", ")));
        }

        output.push_str(&format!(
            "Modules: {} run, {} skipped{}\n",
            meta.modules_run,
            meta.modules_skipped,
            if meta.terminated_early {
                " (time budget exhausted)"
            } else {
                ""
            }
        ));
        output.push_str(&format!("Total time: {:.1}s\n", meta.duration_ms as f64 / 1000.0));

        let exit_desc = match run.exit_code() {
            1 => "failures detected",
            2 => "warnings detected",
            _ => "no issues found",
        };
        output.push_str(&format!("Exit code: {} ({})\n", run.exit_code(), exit_desc));
        output.push_str(RULE);

        output
    }
}

/// JSON formatter
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, run: &AuditRun) -> String {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(run)
        } else {
            serde_json::to_string(run)
        };
        // AuditRun holds only strings, numbers and enums
        encoded.unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
    }
}

/// JUnit XML formatter
pub struct JunitFormatter;

impl JunitFormatter {
    pub fn new() -> Self {
        JunitFormatter
    }

    fn escape_xml(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '<' => result.push_str("&lt;"),
                '>' => result.push_str("&gt;"),
                '&' => result.push_str("&amp;"),
                '"' => result.push_str("&quot;"),
                '\'' => result.push_str("&apos;"),
                c if c.is_control() && c != '\n' && c != '\t' => {}
                c => result.push(c),
            }
        }
        result
    }

    fn push_case(output: &mut String, suite: &str, finding: &Finding) {
        output.push_str(&format!(
            "    <testcase name=\"{}: {}\" classname=\"campaign-audit.{}\" time=\"0.000\">\n",
            Self::escape_xml(&finding.module),
            Self::escape_xml(&finding.item),
            suite
        ));

        let details = Self::escape_xml(&finding.details);
        let recommendation = Self::escape_xml(&finding.recommendation);
        match finding.severity {
            Severity::Fail => output.push_str(&format!(
                "      <failure message=\"{}\">{}</failure>\n",
                details, recommendation
            )),
            Severity::Error => output.push_str(&format!(
                "      <error message=\"{}\">{}</error>\n",
                details, recommendation
            )),
            Severity::Skipped => {
                output.push_str(&format!("      <skipped message=\"{}\" />\n", details))
            }
            Severity::Warn => output.push_str(&format!(
                "      <system-out>WARNING: {} - {}</system-out>\n",
                details, recommendation
            )),
            Severity::Info | Severity::Pass => {
                output.push_str(&format!("      <system-out>{}</system-out>\n", details))
            }
        }
        output.push_str("    </testcase>\n");
    }
}

impl Default for JunitFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JunitFormatter {
    fn format(&self, run: &AuditRun) -> String {
        let totals = &run.report.totals;
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        output.push_str(&format!(
            "<testsuites tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\" time=\"{:.3}\">\n",
            totals.total(),
            totals.fail,
            totals.error,
            totals.skipped,
            run.metadata.duration_ms as f64 / 1000.0
        ));

        for section in run.report.sections.iter().filter(|s| !s.findings.is_empty()) {
            let suite = section.category.label();
            output.push_str(&format!(
                "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\">\n",
                Self::escape_xml(&section.section),
                section.counts.total(),
                section.counts.fail,
                section.counts.error,
                section.counts.skipped
            ));
            for finding in &section.findings {
                Self::push_case(&mut output, suite, finding);
            }
            output.push_str("  </testsuite>\n");
        }

        output.push_str("</testsuites>");
        output
    }
}

/// Get a formatter based on the output format
pub fn get_formatter(
    format: OutputFormat,
    no_color: bool,
    verbose: bool,
    quiet: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TerminalFormatter::new(!no_color, verbose, quiet)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Junit => Box::new(JunitFormatter::new()),
    }
}
