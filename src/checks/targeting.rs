//! Targeting checks.
//!
//! Networks (TGT-001), locations (TGT-002), negative keywords (TGT-003)
//! and ad schedules (TGT-004). All rules are evaluated per campaign.

use super::{campaign_subject, list_campaigns, Outcome, RollUp};
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::{Channel, GeoTargetType, StatusFilter};
use crate::{AuditError, Category, Severity};

/// TGT-001: Network settings
///
/// Only search campaigns are evaluated; other channels choose their
/// networks by design.
pub fn audit_networks(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Search network only";
    let campaigns: Vec<_> = list_campaigns(ctx, StatusFilter::Enabled)?
        .into_iter()
        .filter(|c| c.channel == Channel::Search)
        .collect();
    let mut rollup = RollUp::new(item, "search campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);
        match ctx.source.network_settings(campaign) {
            Ok(networks) if networks.search_partners || networks.display_network => {
                let mut extended = Vec::new();
                if networks.search_partners {
                    extended.push("search partners");
                }
                if networks.display_network {
                    extended.push("the display network");
                }
                rec.record(
                    Category::Targeting,
                    item,
                    Severity::Warn,
                    format!("{} also serves on {}.", subject, extended.join(" and ")),
                    format!(
                        "Opt {} out of {} or move that traffic to a dedicated campaign.",
                        subject,
                        extended.join(" and ")
                    ),
                );
                rollup.tally(Severity::Warn);
            }
            Ok(_) => {
                rec.pass(
                    Category::Targeting,
                    item,
                    format!("{} serves on the search network only.", subject),
                );
                rollup.tally(Severity::Pass);
            }
            Err(e) => {
                rec.unavailable(Category::Targeting, item, &subject, &e);
                rollup.tally(Outcome::Missed);
            }
        }
    });

    rollup.finish(rec, Category::Targeting);
    Ok(())
}

/// TGT-002: Location targeting
pub fn audit_locations(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let targets_item = "Location targets";
    let method_item = "Location targeting method";
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new("Location targeting", "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);

        let targets = match ctx.source.location_targets(campaign) {
            Ok(locations) => {
                let positive: Vec<_> = locations
                    .iter()
                    .filter(|l| !l.negative)
                    .map(|l| l.name.as_str())
                    .collect();
                if positive.is_empty() {
                    rec.record(
                        Category::Targeting,
                        targets_item,
                        Severity::Fail,
                        format!(
                            "{} has no positive location targets and can serve worldwide.",
                            subject
                        ),
                        format!("Add the locations {} is meant to reach.", subject),
                    );
                    Outcome::Flagged
                } else {
                    rec.pass(
                        Category::Targeting,
                        targets_item,
                        format!("{} targets {}.", subject, positive.join(", ")),
                    );
                    Outcome::Passed
                }
            }
            Err(e) => {
                rec.unavailable(Category::Targeting, targets_item, &subject, &e);
                Outcome::Missed
            }
        };

        let method = match ctx.source.geo_target_type(campaign) {
            Ok(GeoTargetType::PresenceOrInterest) => {
                rec.record(
                    Category::Targeting,
                    method_item,
                    Severity::Warn,
                    format!(
                        "{} targets people in or interested in its locations, which admits traffic from outside them.",
                        subject
                    ),
                    format!("Switch {} to presence-based location targeting.", subject),
                );
                Outcome::Flagged
            }
            Ok(GeoTargetType::Presence) => {
                rec.pass(
                    Category::Targeting,
                    method_item,
                    format!("{} targets people present in its locations.", subject),
                );
                Outcome::Passed
            }
            Err(e) => {
                rec.unavailable(Category::Targeting, method_item, &subject, &e);
                Outcome::Missed
            }
        };

        rollup.tally(targets.and(method));
    });

    rollup.finish(rec, Category::Targeting);
    Ok(())
}

/// TGT-003: Negative keywords
pub fn audit_negatives(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Campaign negative keywords";
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);
        match ctx.source.negative_keywords(campaign) {
            Ok(negatives) if negatives.is_empty() => {
                rec.record(
                    Category::Targeting,
                    item,
                    Severity::Warn,
                    format!("{} has no negative keywords.", subject),
                    format!(
                        "Review the search terms of {} and add irrelevant queries as negatives.",
                        subject
                    ),
                );
                rollup.tally(Severity::Warn);
            }
            Ok(negatives) => {
                rec.pass(
                    Category::Targeting,
                    item,
                    format!("{} has {} negative keyword(s).", subject, negatives.len()),
                );
                rollup.tally(Severity::Pass);
            }
            Err(e) => {
                rec.unavailable(Category::Targeting, item, &subject, &e);
                rollup.tally(Outcome::Missed);
            }
        }
    });

    rollup.finish(rec, Category::Targeting);
    Ok(())
}

/// TGT-004: Ad schedule
pub fn audit_schedules(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Ad schedule";
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);
        match ctx.source.ad_schedule(campaign) {
            Ok(slots) if slots.is_empty() => {
                rec.record(
                    Category::Targeting,
                    item,
                    Severity::Info,
                    format!("{} has no ad schedule and runs at all hours.", subject),
                    format!(
                        "Check hour-of-day performance of {} before adding a schedule.",
                        subject
                    ),
                );
                rollup.tally(Severity::Info);
            }
            Ok(slots) => {
                rec.pass(
                    Category::Targeting,
                    item,
                    format!("{} runs on a schedule of {} slot(s).", subject, slots.len()),
                );
                rollup.tally(Severity::Pass);
            }
            Err(e) => {
                rec.unavailable(Category::Targeting, item, &subject, &e);
                rollup.tally(Outcome::Missed);
            }
        }
    });

    rollup.finish(rec, Category::Targeting);
    Ok(())
}
