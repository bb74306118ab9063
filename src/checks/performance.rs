//! Campaign performance checks (PERF-001).
//!
//! Four rules per campaign over the source's stats window: click-through
//! rate, cost per conversion, spend without conversions, and impression
//! share lost to ad rank.

use super::{campaign_subject, list_campaigns, percent, Outcome, RollUp};
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::{CampaignRef, Stats, StatusFilter};
use crate::{AuditError, Category, Severity};

const CTR: &str = "Click-through rate";
const CPA: &str = "Cost per conversion";
const WASTED: &str = "Spend without conversions";
const RANK: &str = "Impression share lost to rank";

/// PERF-001: Campaign efficiency
pub fn audit_efficiency(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new("Campaign efficiency", "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);
        let stats = match ctx.source.campaign_stats(campaign) {
            Ok(stats) => Some(stats),
            Err(e) => {
                rec.unavailable(Category::Performance, "Campaign stats", &subject, &e);
                None
            }
        };

        let mut outcome = match stats {
            Some(stats) => evaluate_stats(ctx, rec, &subject, &stats),
            None => Outcome::Missed,
        };
        outcome = outcome.and(evaluate_rank(ctx, rec, campaign, &subject));
        rollup.tally(outcome);
    });

    rollup.finish(rec, Category::Performance);
    Ok(())
}

fn evaluate_stats(
    ctx: &AuditContext<'_>,
    rec: &mut Recorder,
    subject: &str,
    stats: &Stats,
) -> Outcome {
    let t = ctx.thresholds;
    let mut outcome = Outcome::Passed;

    match stats.ctr() {
        Some(ctr) if stats.impressions >= t.min_impressions_for_ctr => {
            if ctr < t.min_ctr {
                rec.record(
                    Category::Performance,
                    CTR,
                    Severity::Warn,
                    format!(
                        "{} has a CTR of {} over {} impressions (minimum {}).",
                        subject,
                        percent(ctr),
                        stats.impressions,
                        percent(t.min_ctr)
                    ),
                    format!("Tighten keyword-to-ad relevance in {}.", subject),
                );
                outcome = outcome.and(Outcome::Flagged);
            } else {
                rec.pass(
                    Category::Performance,
                    CTR,
                    format!("{} has a CTR of {}.", subject, percent(ctr)),
                );
            }
        }
        _ => {
            rec.record(
                Category::Performance,
                CTR,
                Severity::Info,
                format!(
                    "{} has {} impressions; at least {} are needed to judge CTR.",
                    subject,
                    stats.impressions,
                    t.min_impressions_for_ctr
                ),
                "N/A",
            );
            outcome = outcome.and(Outcome::Missed);
        }
    }

    match stats.cpa() {
        Some(cpa) if cpa > t.max_cpa => {
            rec.record(
                Category::Performance,
                CPA,
                Severity::Fail,
                format!(
                    "{} costs {:.2} per conversion (maximum {:.2}).",
                    subject,
                    cpa,
                    t.max_cpa
                ),
                format!(
                    "Cut low-converting keywords and placements in {}, or lower its bids.",
                    subject
                ),
            );
            outcome = outcome.and(Outcome::Flagged);
        }
        Some(cpa) => {
            rec.pass(
                Category::Performance,
                CPA,
                format!("{} costs {:.2} per conversion.", subject, cpa),
            );
        }
        None if stats.cost > 0.0 => {
            rec.record(
                Category::Performance,
                WASTED,
                Severity::Warn,
                format!("{} spent {:.2} without recording a conversion.", subject, stats.cost),
                format!(
                    "Confirm conversion tracking covers {} and review its search terms.",
                    subject
                ),
            );
            outcome = outcome.and(Outcome::Flagged);
        }
        None => {
            rec.record(
                Category::Performance,
                CPA,
                Severity::Info,
                format!("{} had no spend and no conversions in the stats window.", subject),
                "N/A",
            );
            outcome = outcome.and(Outcome::Missed);
        }
    }

    outcome
}

fn evaluate_rank(
    ctx: &AuditContext<'_>,
    rec: &mut Recorder,
    campaign: &CampaignRef,
    subject: &str,
) -> Outcome {
    let max = ctx.thresholds.max_lost_is_rank;
    match ctx.source.impression_share(campaign) {
        Ok(share) if share.lost_to_rank > max => {
            rec.record(
                Category::Performance,
                RANK,
                Severity::Warn,
                format!(
                    "{} lost {} of eligible impressions to ad rank (maximum {}).",
                    subject,
                    percent(share.lost_to_rank),
                    percent(max)
                ),
                format!("Improve quality score or raise bids in {}.", subject),
            );
            Outcome::Flagged
        }
        Ok(share) => {
            rec.pass(
                Category::Performance,
                RANK,
                format!(
                    "{} lost {} of eligible impressions to ad rank.",
                    subject,
                    percent(share.lost_to_rank)
                ),
            );
            Outcome::Passed
        }
        Err(e) => {
            rec.unavailable(Category::Performance, RANK, subject, &e);
            Outcome::Missed
        }
    }
}
