//! Account structure checks.
//!
//! Counts of active children per parent: ad groups per campaign (STR-001),
//! keywords per ad group (STR-002), ads per ad group (STR-003).

use super::{
    ad_group_subject, campaign_subject, list_ad_groups, list_ads, list_campaigns, Outcome, RollUp,
};
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::StatusFilter;
use crate::{AuditError, Category, Severity};

/// STR-001: Active ad groups per campaign
pub fn audit_ad_group_counts(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Active ad groups per campaign";
    let (min, max) = (
        ctx.thresholds.min_active_ad_groups,
        ctx.thresholds.max_active_ad_groups,
    );
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let Some(groups) = list_ad_groups(
            ctx,
            rec,
            Category::CampaignStructure,
            item,
            campaign,
            StatusFilter::Enabled,
        ) else {
            rollup.tally(Outcome::Missed);
            return;
        };

        let count = groups.len();
        let subject = campaign_subject(campaign);
        let severity = if count < min {
            rec.record(
                Category::CampaignStructure,
                item,
                Severity::Fail,
                format!("{} has {} active ad group(s); at least {} expected.", subject, count, min),
                format!("Split {} into tightly themed ad groups.", subject),
            );
            Severity::Fail
        } else if count > max {
            rec.record(
                Category::CampaignStructure,
                item,
                Severity::Warn,
                format!(
                    "{} has {} active ad groups; more than {} is hard to manage.",
                    subject,
                    count,
                    max
                ),
                format!("Consider splitting {} into several campaigns.", subject),
            );
            Severity::Warn
        } else {
            rec.pass(
                Category::CampaignStructure,
                item,
                format!("{} has {} active ad groups.", subject, count),
            );
            Severity::Pass
        };
        rollup.tally(severity);
    });

    rollup.finish(rec, Category::CampaignStructure);
    Ok(())
}

/// STR-002: Keywords per ad group
pub fn audit_keyword_counts(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Keywords per ad group";
    let (min, max) = (
        ctx.thresholds.min_keywords_per_ad_group,
        ctx.thresholds.max_keywords_per_ad_group,
    );
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "ad groups");

    ctx.pacing.each(&campaigns, |campaign| {
        let Some(groups) = list_ad_groups(
            ctx,
            rec,
            Category::CampaignStructure,
            item,
            campaign,
            StatusFilter::Enabled,
        ) else {
            rollup.unlisted("campaign");
            return;
        };

        ctx.pacing.each(&groups, |group| {
            let subject = ad_group_subject(group);
            let count = match ctx.source.keywords(group, StatusFilter::Enabled) {
                Ok(keywords) => keywords.len(),
                Err(e) => {
                    rec.unavailable(Category::CampaignStructure, item, &subject, &e);
                    rollup.tally(Outcome::Missed);
                    return;
                }
            };

            let severity = if count == 0 {
                rec.record(
                    Category::CampaignStructure,
                    item,
                    Severity::Fail,
                    format!(
                        "{} in {} has no active keywords and cannot serve.",
                        subject,
                        campaign_subject(campaign)
                    ),
                    format!("Add keywords to {} or pause it.", subject),
                );
                Severity::Fail
            } else if count < min || count > max {
                rec.record(
                    Category::CampaignStructure,
                    item,
                    Severity::Warn,
                    format!("{} has {} active keywords; {}-{} expected.", subject, count, min, max),
                    format!("Rebalance keywords in {}.", subject),
                );
                Severity::Warn
            } else {
                rec.pass(
                    Category::CampaignStructure,
                    item,
                    format!("{} has {} active keywords.", subject, count),
                );
                Severity::Pass
            };
            rollup.tally(severity);
        });
    });

    rollup.finish(rec, Category::CampaignStructure);
    Ok(())
}

/// STR-003: Ads per ad group
pub fn audit_ad_counts(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Ads per ad group";
    let min = ctx.thresholds.min_ads_per_ad_group;
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "ad groups");

    ctx.pacing.each(&campaigns, |campaign| {
        let Some(groups) = list_ad_groups(
            ctx,
            rec,
            Category::CampaignStructure,
            item,
            campaign,
            StatusFilter::Enabled,
        ) else {
            rollup.unlisted("campaign");
            return;
        };

        ctx.pacing.each(&groups, |group| {
            let Some(ads) = list_ads(ctx, rec, Category::CampaignStructure, item, group) else {
                rollup.tally(Outcome::Missed);
                return;
            };

            let subject = ad_group_subject(group);
            let count = ads.len();
            let severity = if count == 0 {
                rec.record(
                    Category::CampaignStructure,
                    item,
                    Severity::Fail,
                    format!("{} has no enabled ads.", subject),
                    format!("Create at least {} ads in {}.", min, subject),
                );
                Severity::Fail
            } else if count < min {
                rec.record(
                    Category::CampaignStructure,
                    item,
                    Severity::Warn,
                    format!(
                        "{} has {} enabled ad(s); at least {} allow rotation testing.",
                        subject,
                        count,
                        min
                    ),
                    format!("Add another ad variant to {}.", subject),
                );
                Severity::Warn
            } else {
                rec.pass(
                    Category::CampaignStructure,
                    item,
                    format!("{} has {} enabled ads.", subject, count),
                );
                Severity::Pass
            };
            rollup.tally(severity);
        });
    });

    rollup.finish(rec, Category::CampaignStructure);
    Ok(())
}
