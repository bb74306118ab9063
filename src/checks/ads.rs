//! Ad checks (AD-001 approval, AD-002 ad strength).

use super::{ad_subject, each_ad, Outcome, RollUp};
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::{AdKind, AdStrength, ApprovalStatus};
use crate::{AuditError, Category, Severity};

/// AD-001: Ad approval
pub fn audit_approval(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Ad approval";
    let mut rollup = RollUp::new(item, "ads");

    each_ad(ctx, rec, &mut rollup, Category::Ads, item, |rec, rollup, group, ad| {
        let subject = ad_subject(ad, group);
        match ctx.source.approval_status(ad) {
            Ok(ApprovalStatus::Approved) => {
                rec.pass(Category::Ads, item, format!("{} is approved.", subject));
                rollup.tally(Severity::Pass);
            }
            Ok(ApprovalStatus::Disapproved) => {
                rec.record(
                    Category::Ads,
                    item,
                    Severity::Fail,
                    format!("{} is disapproved and cannot serve.", subject),
                    format!("Fix the policy issue on {} and resubmit it.", subject),
                );
                rollup.tally(Severity::Fail);
            }
            Ok(status) => {
                let state = match status {
                    ApprovalStatus::ApprovedLimited => "approved with limitations",
                    _ => "still under review",
                };
                rec.record(
                    Category::Ads,
                    item,
                    Severity::Warn,
                    format!("{} is {}.", subject, state),
                    format!("Check the policy details of {}.", subject),
                );
                rollup.tally(Severity::Warn);
            }
            Err(e) => {
                rec.unavailable(Category::Ads, item, &subject, &e);
                rollup.tally(Outcome::Missed);
            }
        }
    })?;

    rollup.finish(rec, Category::Ads);
    Ok(())
}

/// AD-002: Ad strength
///
/// Only responsive search ads carry a strength rating.
pub fn audit_strength(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Responsive search ad strength";
    let mut rollup = RollUp::new(item, "responsive search ads");

    each_ad(ctx, rec, &mut rollup, Category::Ads, item, |rec, rollup, group, ad| {
        if ad.kind != AdKind::ResponsiveSearch {
            return;
        }
        let subject = ad_subject(ad, group);
        match ctx.source.ad_strength(ad) {
            Ok(AdStrength::Good | AdStrength::Excellent) => {
                rec.pass(
                    Category::Ads,
                    item,
                    format!("{} has good or excellent ad strength.", subject),
                );
                rollup.tally(Severity::Pass);
            }
            Ok(AdStrength::Poor) => {
                rec.record(
                    Category::Ads,
                    item,
                    Severity::Warn,
                    format!("{} has poor ad strength.", subject),
                    format!("Add more distinct headlines and descriptions to {}.", subject),
                );
                rollup.tally(Severity::Warn);
            }
            Ok(AdStrength::Average) => {
                rec.record(
                    Category::Ads,
                    item,
                    Severity::Info,
                    format!("{} has average ad strength.", subject),
                    format!("Consider adding headlines with keywords to {}.", subject),
                );
                rollup.tally(Severity::Info);
            }
            Ok(AdStrength::Pending) => {
                rec.record(
                    Category::Ads,
                    item,
                    Severity::Info,
                    format!("{} has not been rated yet.", subject),
                    "Re-check once the rating is available.",
                );
                rollup.tally(Severity::Info);
            }
            Err(e) => {
                rec.unavailable(Category::Ads, item, &subject, &e);
                rollup.tally(Outcome::Missed);
            }
        }
    })?;

    rollup.finish(rec, Category::Ads);
    Ok(())
}
