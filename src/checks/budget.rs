//! Budget and bidding checks.
//!
//! BUD-001 evaluates two rules per campaign: a non-zero daily budget, and
//! impression share lost to budget at or below the threshold. BUD-002 flags
//! manual bidding.

use super::{campaign_subject, list_campaigns, percent, Outcome, RollUp};
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::StatusFilter;
use crate::{AuditError, Category, Severity};

/// BUD-001: Budget health
pub fn audit_budgets(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let amount_item = "Daily budget set";
    let lost_item = "Impression share lost to budget";
    let max_lost = ctx.thresholds.max_lost_is_budget;
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new("Budget health", "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);

        let amount = match ctx.source.budget(campaign) {
            Ok(budget) if budget.daily_amount <= 0.0 => {
                rec.record(
                    Category::BudgetBidding,
                    amount_item,
                    Severity::Fail,
                    format!("{} is enabled with a zero daily budget.", subject),
                    format!("Set a daily budget for {} or pause it.", subject),
                );
                Outcome::Flagged
            }
            Ok(budget) => {
                let shared = if budget.shared { " (shared)" } else { "" };
                rec.pass(
                    Category::BudgetBidding,
                    amount_item,
                    format!(
                        "{} has a daily budget of {:.2}{}.",
                        subject,
                        budget.daily_amount,
                        shared
                    ),
                );
                Outcome::Passed
            }
            Err(e) => {
                rec.unavailable(Category::BudgetBidding, amount_item, &subject, &e);
                Outcome::Missed
            }
        };

        let lost = match ctx.source.impression_share(campaign) {
            Ok(share) if share.lost_to_budget > max_lost => {
                rec.record(
                    Category::BudgetBidding,
                    lost_item,
                    Severity::Fail,
                    format!(
                        "{} lost {} of eligible impressions to budget (maximum {}).",
                        subject,
                        percent(share.lost_to_budget),
                        percent(max_lost)
                    ),
                    format!("Raise the budget of {} or narrow its targeting.", subject),
                );
                Outcome::Flagged
            }
            Ok(share) => {
                rec.pass(
                    Category::BudgetBidding,
                    lost_item,
                    format!(
                        "{} lost {} of eligible impressions to budget.",
                        subject,
                        percent(share.lost_to_budget)
                    ),
                );
                Outcome::Passed
            }
            Err(e) => {
                rec.unavailable(Category::BudgetBidding, lost_item, &subject, &e);
                Outcome::Missed
            }
        };

        rollup.tally(amount.and(lost));
    });

    rollup.finish(rec, Category::BudgetBidding);
    Ok(())
}

/// BUD-002: Bidding strategy
pub fn audit_bidding(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Automated bidding";
    let campaigns = list_campaigns(ctx, StatusFilter::Enabled)?;
    let mut rollup = RollUp::new(item, "campaigns");

    ctx.pacing.each(&campaigns, |campaign| {
        let subject = campaign_subject(campaign);
        match ctx.source.bidding_strategy(campaign) {
            Ok(strategy) if strategy.is_manual() => {
                rec.record(
                    Category::BudgetBidding,
                    item,
                    Severity::Warn,
                    format!("{} uses {} bidding.", subject, strategy.label()),
                    format!(
                        "Move {} to a conversion-based automated strategy once it has conversion history.",
                        subject
                    ),
                );
                rollup.tally(Severity::Warn);
            }
            Ok(strategy) => {
                rec.pass(
                    Category::BudgetBidding,
                    item,
                    format!("{} uses {} bidding.", subject, strategy.label()),
                );
                rollup.tally(Severity::Pass);
            }
            Err(e) => {
                rec.unavailable(Category::BudgetBidding, item, &subject, &e);
                rollup.tally(Outcome::Missed);
            }
        }
    });

    rollup.finish(rec, Category::BudgetBidding);
    Ok(())
}
