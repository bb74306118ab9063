//! Keyword checks.
//!
//! KW-001 quality score, KW-002 broad match share under manual bidding,
//! KW-003 duplicate keywords.
//!
//! Duplicate detection compares normalized keyword text plus match type
//! across the ad groups of a single campaign. Cross-campaign overlap and
//! close variants are not detected.

use super::{
    ad_group_subject, campaign_subject, list_ad_groups, list_campaigns, percent, Outcome, RollUp,
};
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::{CampaignRef, KeywordRef, MatchType, StatusFilter};
use crate::{AuditError, Category, Severity};
use std::collections::{BTreeMap, BTreeSet};

/// Lowercase and collapse internal whitespace.
pub fn normalize_keyword(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// KW-001: Quality score
pub fn audit_quality_scores(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Keyword quality score";
    let min = ctx.thresholds.min_quality_score;
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "keywords");
    let mut scored: Vec<u8> = Vec::new();

    ctx.pacing.each(&campaigns, |campaign| {
        let Some(groups) =
            list_ad_groups(ctx, rec, Category::Keywords, item, campaign, StatusFilter::Enabled)
        else {
            rollup.unlisted("campaign");
            return;
        };

        ctx.pacing.each(&groups, |group| {
            let keywords = match ctx.source.keywords(group, StatusFilter::Enabled) {
                Ok(keywords) => keywords,
                Err(e) => {
                    rec.unavailable(Category::Keywords, item, &ad_group_subject(group), &e);
                    rollup.unlisted("ad group");
                    return;
                }
            };

            ctx.pacing.each(&keywords, |keyword| {
                let subject = format!("keyword '{}' in {}", keyword.text, ad_group_subject(group));
                match ctx.source.quality_score(keyword) {
                    Ok(Some(score)) if score < min => {
                        scored.push(score);
                        rec.record(
                            Category::Keywords,
                            item,
                            Severity::Warn,
                            format!("{} has quality score {} (minimum {}).", subject, score, min),
                            format!(
                                "Improve ad relevance and landing page experience for {}, or tighten its ad group.",
                                subject
                            ),
                        );
                        rollup.tally(Severity::Warn);
                    }
                    Ok(Some(score)) => {
                        scored.push(score);
                        rec.pass(
                            Category::Keywords,
                            item,
                            format!("{} has quality score {}.", subject, score),
                        );
                        rollup.tally(Severity::Pass);
                    }
                    Ok(None) => {
                        rec.record(
                            Category::Keywords,
                            item,
                            Severity::Info,
                            format!("{} has no quality score yet.", subject),
                            "Re-check once the keyword has accumulated impressions.",
                        );
                        rollup.tally(Severity::Info);
                    }
                    Err(e) => {
                        rec.unavailable(Category::Keywords, item, &subject, &e);
                        rollup.tally(Outcome::Missed);
                    }
                }
            });
        });
    });

    if !scored.is_empty() {
        let average = scored.iter().map(|&s| f64::from(s)).sum::<f64>() / scored.len() as f64;
        rollup.note(format!(
            "Average quality score {:.1} across {} scored keyword(s).",
            average,
            scored.len()
        ));
    }
    rollup.finish(rec, Category::Keywords);
    Ok(())
}

/// KW-002: Match type mix
pub fn audit_match_types(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Broad match under manual bidding";
    let max_share = ctx.thresholds.max_broad_match_share;
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);
        let strategy = match ctx.source.bidding_strategy(campaign) {
            Ok(strategy) => strategy,
            Err(e) => {
                rec.unavailable(Category::Keywords, item, &subject, &e);
                rollup.tally(Outcome::Missed);
                return;
            }
        };

        let Some(keywords) = campaign_keywords(ctx, rec, item, campaign) else {
            rollup.tally(Outcome::Missed);
            return;
        };
        if keywords.is_empty() {
            rec.record(
                Category::Keywords,
                item,
                Severity::Info,
                format!("{} has no active keywords.", subject),
                "N/A",
            );
            rollup.tally(Severity::Info);
            return;
        }

        let broad = keywords
            .iter()
            .filter(|k| k.match_type == MatchType::Broad)
            .count();
        let share = broad as f64 / keywords.len() as f64;

        if strategy.is_manual() && share > max_share {
            rec.record(
                Category::Keywords,
                item,
                Severity::Warn,
                format!(
                    "{} uses {} bidding with {} broad match keywords (maximum {}).",
                    subject,
                    strategy.label(),
                    percent(share),
                    percent(max_share)
                ),
                format!(
                    "Use phrase or exact match in {}, or move it to automated bidding before relying on broad match.",
                    subject
                ),
            );
            rollup.tally(Severity::Warn);
        } else {
            rec.pass(
                Category::Keywords,
                item,
                format!(
                    "{} has {} broad match keywords under {} bidding.",
                    subject,
                    percent(share),
                    strategy.label()
                ),
            );
            rollup.tally(Severity::Pass);
        }
    });

    rollup.finish(rec, Category::Keywords);
    Ok(())
}

/// KW-003: Duplicate keywords
pub fn audit_duplicates(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Duplicate keywords";
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "campaigns");
    rollup.note("Only ad groups within the same campaign are compared.");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);
        let Some(groups) =
            list_ad_groups(ctx, rec, Category::Keywords, item, campaign, StatusFilter::Enabled)
        else {
            rollup.tally(Outcome::Missed);
            return;
        };

        let mut complete = true;
        let mut seen: BTreeMap<(String, &'static str), BTreeSet<String>> = BTreeMap::new();
        for group in &groups {
            match ctx.source.keywords(group, StatusFilter::Enabled) {
                Ok(keywords) => {
                    for keyword in keywords {
                        seen.entry((normalize_keyword(&keyword.text), keyword.match_type.label()))
                            .or_default()
                            .insert(group.name.clone());
                    }
                }
                Err(e) => {
                    rec.unavailable(Category::Keywords, item, &ad_group_subject(group), &e);
                    complete = false;
                }
            }
        }

        let duplicates: Vec<_> = seen.into_iter().filter(|(_, groups)| groups.len() > 1).collect();
        for ((text, match_type), groups) in &duplicates {
            let names: Vec<_> = groups.iter().map(|g| format!("'{}'", g)).collect();
            rec.record(
                Category::Keywords,
                item,
                Severity::Warn,
                format!(
                    "[{}] {} appears in {} ad groups of {}: {}.",
                    match_type,
                    text,
                    groups.len(),
                    subject,
                    names.join(", ")
                ),
                format!("Keep '{}' in one ad group and remove or pause the others.", text),
            );
        }

        if !duplicates.is_empty() {
            rollup.tally(Outcome::Flagged);
        } else if complete {
            rec.pass(
                Category::Keywords,
                item,
                format!("No duplicate keywords across the ad groups of {}.", subject),
            );
            rollup.tally(Outcome::Passed);
        } else {
            rollup.tally(Outcome::Missed);
        }
    });

    rollup.finish(rec, Category::Keywords);
    Ok(())
}

/// Every active keyword of a campaign.
fn campaign_keywords(
    ctx: &AuditContext<'_>,
    rec: &mut Recorder,
    item: &str,
    campaign: &CampaignRef,
) -> Option<Vec<KeywordRef>> {
    let groups =
        list_ad_groups(ctx, rec, Category::Keywords, item, campaign, StatusFilter::Enabled)?;
    let mut all = Vec::new();
    for group in &groups {
        match ctx.source.keywords(group, StatusFilter::Enabled) {
            Ok(keywords) => all.extend(keywords),
            Err(e) => {
                rec.unavailable(Category::Keywords, item, &ad_group_subject(group), &e);
                return None;
            }
        }
    }
    Some(all)
}
