//! Naming convention checks (NAM-001, NAM-002).

use super::{list_ad_groups, list_campaigns, RollUp};
use crate::config::NamingPattern;
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::StatusFilter;
use crate::{AuditError, Category, Severity};

fn check_name(
    rec: &mut Recorder,
    item: &str,
    kind: &str,
    name: &str,
    pattern: &NamingPattern,
) -> Severity {
    if pattern.matches(name) {
        rec.pass(
            Category::Naming,
            item,
            format!("{} '{}' follows the naming convention.", kind, name),
        );
        Severity::Pass
    } else {
        rec.record(
            Category::Naming,
            item,
            Severity::Warn,
            format!(
                "{} '{}' does not match the naming pattern `{}`.",
                kind,
                name,
                pattern.as_str()
            ),
            format!("Rename '{}' to follow the naming convention.", name),
        );
        Severity::Warn
    }
}

/// NAM-001: Campaign naming
pub fn audit_campaign_names(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Campaign naming";
    let campaigns = list_campaigns(ctx, StatusFilter::EnabledOrPaused)?;
    let mut rollup = RollUp::new(item, "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let severity =
            check_name(rec, item, "Campaign", &campaign.name, &ctx.naming.campaign_pattern);
        rollup.tally(severity);
    });

    rollup.finish(rec, Category::Naming);
    Ok(())
}

/// NAM-002: Ad group naming
pub fn audit_ad_group_names(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Ad group naming";
    let campaigns = list_campaigns(ctx, StatusFilter::EnabledOrPaused)?;
    let mut rollup = RollUp::new(item, "ad groups");

    ctx.pacing.each(&campaigns, |campaign| {
        let Some(groups) = list_ad_groups(
            ctx,
            rec,
            Category::Naming,
            item,
            campaign,
            StatusFilter::EnabledOrPaused,
        ) else {
            rollup.unlisted("campaign");
            return;
        };
        ctx.pacing.each(&groups, |group| {
            let severity =
                check_name(rec, item, "Ad group", &group.name, &ctx.naming.ad_group_pattern);
            rollup.tally(severity);
        });
    });

    rollup.finish(rec, Category::Naming);
    Ok(())
}
