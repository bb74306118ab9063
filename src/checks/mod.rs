//! Check modules.
//!
//! One file per functional area:
//! - Tracking: auto-tagging, conversion actions, account settings
//! - Structure: ad group, keyword and ad counts
//! - Naming: campaign and ad group naming conventions
//! - Budget: budget health and bidding strategy
//! - Targeting: networks, locations, negatives, schedules
//! - Keywords: quality score, match types, duplicates
//! - Ads: approval and ad strength
//! - Extensions, Landing: extension coverage and final URLs
//! - Performance: CTR, CPA, impression share lost to rank
//! - Manual: checklist items a human must verify
//!
//! # Graceful Degradation
//!
//! All modules follow these degradation rules:
//! - Attribute read failed: one Error finding for that entity and rule,
//!   then continue with the next rule or entity
//! - Capability unsupported by the source: one Info finding naming the
//!   manual action
//! - Child listing failed: one finding for the parent, which the roll-up
//!   names apart from the entities it counts
//! - Root listing failed: the module returns `Err` and the orchestrator
//!   records it as a single Error finding
//!
//! Every module ends with roll-up findings. A roll-up is Pass only when
//! every entity was evaluated and passed.

pub mod ads;
pub mod budget;
pub mod extensions;
pub mod keywords;
pub mod landing;
pub mod manual;
pub mod naming;
pub mod performance;
pub mod structure;
pub mod targeting;
pub mod tracking;

use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::{AdGroupRef, AdRef, CampaignRef, StatusFilter};
use crate::{AuditError, Category, Severity};

/// How one entity fared against one rule, for roll-up purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Flagged,
    /// Data unavailable or not conclusive
    Missed,
}

impl Outcome {
    /// Combine the outcomes of several rules on one entity.
    pub fn and(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Flagged, _) | (_, Outcome::Flagged) => Outcome::Flagged,
            (Outcome::Missed, _) | (_, Outcome::Missed) => Outcome::Missed,
            _ => Outcome::Passed,
        }
    }
}

impl From<Severity> for Outcome {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Pass => Outcome::Passed,
            Severity::Fail | Severity::Warn => Outcome::Flagged,
            Severity::Info | Severity::Error | Severity::Skipped => Outcome::Missed,
        }
    }
}

/// Population summary for one rule.
#[derive(Debug)]
pub struct RollUp {
    rule: String,
    noun: &'static str,
    passed: usize,
    flagged: usize,
    missed: usize,
    /// Parents whose children could not be listed, by parent noun
    unlisted: Vec<(&'static str, usize)>,
    note: Option<String>,
}

impl RollUp {
    pub fn new(rule: &str, noun: &'static str) -> Self {
        RollUp {
            rule: rule.to_string(),
            noun,
            passed: 0,
            flagged: 0,
            missed: 0,
            unlisted: Vec::new(),
            note: None,
        }
    }

    pub fn tally(&mut self, outcome: impl Into<Outcome>) {
        match outcome.into() {
            Outcome::Passed => self.passed += 1,
            Outcome::Flagged => self.flagged += 1,
            Outcome::Missed => self.missed += 1,
        }
    }

    /// A parent (e.g. "campaign") whose children could not be listed. It is
    /// not counted in the population.
    pub fn unlisted(&mut self, parent: &'static str) {
        match self.unlisted.iter_mut().find(|(known, _)| *known == parent) {
            Some((_, count)) => *count += 1,
            None => self.unlisted.push((parent, 1)),
        }
    }

    /// Extra sentence appended to the summary details.
    pub fn note(&mut self, note: impl Into<String>) {
        self.note = Some(note.into());
    }

    pub fn total(&self) -> usize {
        self.passed + self.flagged + self.missed
    }

    pub fn severity(&self) -> Severity {
        if self.total() > 0 && self.passed == self.total() && self.unlisted.is_empty() {
            Severity::Pass
        } else {
            Severity::Info
        }
    }

    /// Record the roll-up finding.
    pub fn finish(self, rec: &mut Recorder, category: Category) {
        let item = format!("{} (summary)", self.rule);
        let total = self.total();

        let mut details = if total == 0 {
            format!("No {} to evaluate for {}.", self.noun, self.rule.to_lowercase())
        } else {
            let mut details = format!(
                "{} of {} {} pass {}.",
                self.passed,
                total,
                self.noun,
                self.rule.to_lowercase()
            );
            if self.flagged > 0 {
                details.push_str(&format!(" {} flagged.", self.flagged));
            }
            if self.missed > 0 {
                details.push_str(&format!(" {} could not be fully evaluated.", self.missed));
            }
            if let Some(note) = &self.note {
                details.push(' ');
                details.push_str(note);
            }
            details
        };
        for (parent, count) in &self.unlisted {
            details.push_str(&format!(
                " The {} of {} {}(s) could not be listed.",
                self.noun, count, parent
            ));
        }

        let nothing_to_review = total == 0 && self.unlisted.is_empty();
        let recommendation = if self.severity() == Severity::Pass || nothing_to_review {
            "N/A".to_string()
        } else {
            format!("Review the individual {} findings above.", self.rule.to_lowercase())
        };
        rec.record(category, item, self.severity(), details, recommendation);
    }
}

/// List campaigns. A failure here aborts the module.
pub fn list_campaigns(
    ctx: &AuditContext<'_>,
    filter: StatusFilter,
) -> Result<Vec<CampaignRef>, AuditError> {
    Ok(ctx.source.campaigns(filter)?)
}

/// List ad groups of one campaign, recording a finding when that fails.
pub fn list_ad_groups(
    ctx: &AuditContext<'_>,
    rec: &mut Recorder,
    category: Category,
    item: &str,
    campaign: &CampaignRef,
    filter: StatusFilter,
) -> Option<Vec<AdGroupRef>> {
    match ctx.source.ad_groups(campaign, filter) {
        Ok(groups) => Some(groups),
        Err(e) => {
            rec.unavailable(category, item, &campaign_subject(campaign), &e);
            None
        }
    }
}

/// List ads of one ad group, recording a finding when that fails.
pub fn list_ads(
    ctx: &AuditContext<'_>,
    rec: &mut Recorder,
    category: Category,
    item: &str,
    group: &AdGroupRef,
) -> Option<Vec<AdRef>> {
    match ctx.source.ads(group, StatusFilter::Enabled) {
        Ok(ads) => Some(ads),
        Err(e) => {
            rec.unavailable(category, item, &ad_group_subject(group), &e);
            None
        }
    }
}

/// Walk every enabled ad of every enabled campaign. Listing failures are
/// recorded once for the parent and reported apart from the ad count.
pub fn each_ad(
    ctx: &AuditContext<'_>,
    rec: &mut Recorder,
    rollup: &mut RollUp,
    category: Category,
    item: &str,
    mut visit: impl FnMut(&mut Recorder, &mut RollUp, &AdGroupRef, &AdRef),
) -> Result<(), AuditError> {
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    ctx.pacing.each(&campaigns, |campaign| {
        let Some(groups) =
            list_ad_groups(ctx, rec, category, item, campaign, StatusFilter::Enabled)
        else {
            rollup.unlisted("campaign");
            return;
        };
        ctx.pacing.each(&groups, |group| {
            let Some(ads) = list_ads(ctx, rec, category, item, group) else {
                rollup.unlisted("ad group");
                return;
            };
            ctx.pacing.each(&ads, |ad| visit(rec, rollup, group, ad));
        });
    });
    Ok(())
}

pub fn campaign_subject(campaign: &CampaignRef) -> String {
    format!("campaign '{}'", campaign.name)
}

pub fn ad_group_subject(group: &AdGroupRef) -> String {
    format!("ad group '{}'", group.name)
}

pub fn ad_subject(ad: &AdRef, group: &AdGroupRef) -> String {
    format!("ad {} in ad group '{}'", ad.id, group.name)
}

/// Format a proportion as a percentage.
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
