//! Landing page checks (LP-001).

use super::{ad_subject, each_ad, Outcome, RollUp};
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::{AuditError, Category, Severity};

fn is_secure(url: &str) -> bool {
    url.trim()
        .get(..8)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
}

/// LP-001: Landing pages
pub fn audit_final_urls(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Final URL";
    let mut rollup = RollUp::new(item, "ads");

    each_ad(ctx, rec, &mut rollup, Category::LandingPages, item, |rec, rollup, group, ad| {
        let subject = ad_subject(ad, group);
        let urls = match ctx.source.final_urls(ad) {
            Ok(urls) => urls,
            Err(e) => {
                rec.unavailable(Category::LandingPages, item, &subject, &e);
                rollup.tally(Outcome::Missed);
                return;
            }
        };

        let urls: Vec<_> = urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).collect();
        let insecure: Vec<_> = urls.iter().copied().filter(|u| !is_secure(u)).collect();

        if urls.is_empty() {
            rec.record(
                Category::LandingPages,
                item,
                Severity::Fail,
                format!("{} has no final URL.", subject),
                format!("Set a final URL on {}.", subject),
            );
            rollup.tally(Severity::Fail);
        } else if !insecure.is_empty() {
            rec.record(
                Category::LandingPages,
                item,
                Severity::Warn,
                format!("{} links to non-HTTPS page(s): {}.", subject, insecure.join(", ")),
                "Serve landing pages over HTTPS and update the final URLs.",
            );
            rollup.tally(Severity::Warn);
        } else {
            rec.pass(
                Category::LandingPages,
                item,
                format!("{} links to {}.", subject, urls.join(", ")),
            );
            rollup.tally(Severity::Pass);
        }
    })?;

    rollup.finish(rec, Category::LandingPages);
    Ok(())
}
