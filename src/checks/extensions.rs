//! Extension coverage checks (EXT-001).

use super::{campaign_subject, list_campaigns, Outcome, RollUp};
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::StatusFilter;
use crate::{AuditError, Category, Severity};

/// EXT-001: Extensions
pub fn audit_extensions(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let t = ctx.thresholds;
    let mut rollup = RollUp::new("Extension coverage", "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);
        let counts = match ctx.source.extensions(campaign) {
            Ok(counts) => counts,
            Err(e) => {
                rec.unavailable(Category::Extensions, "Extensions", &subject, &e);
                rollup.tally(Outcome::Missed);
                return;
            }
        };

        let mut outcome = Outcome::Passed;
        for (item, kind, have, min) in [
            ("Sitelinks", "sitelink", counts.sitelinks, t.min_sitelinks),
            ("Callouts", "callout", counts.callouts, t.min_callouts),
            (
                "Structured snippets",
                "structured snippet",
                counts.structured_snippets,
                t.min_structured_snippets,
            ),
        ] {
            if have < min {
                rec.record(
                    Category::Extensions,
                    item,
                    Severity::Warn,
                    format!("{} has {} {}(s); at least {} recommended.", subject, have, kind, min),
                    format!("Add {} more {}(s) to {}.", min - have, kind, subject),
                );
                outcome = outcome.and(Outcome::Flagged);
            } else {
                rec.pass(
                    Category::Extensions,
                    item,
                    format!("{} has {} {}(s).", subject, have, kind),
                );
            }
        }
        rollup.tally(outcome);
    });

    rollup.finish(rec, Category::Extensions);
    Ok(())
}
