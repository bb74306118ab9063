//! Conversion tracking and account-level checks.
//!
//! TRK-001 auto-tagging, TRK-002 conversion actions, ACC-001 account settings.

use super::RollUp;
use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::source::EntityStatus;
use crate::{AuditError, Category, Severity};

const ACCOUNT: &str = "the account";

/// TRK-001: Auto-tagging
pub fn audit_auto_tagging(ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    let item = "Auto-tagging enabled";
    match ctx.source.auto_tagging_enabled() {
        Ok(true) => rec.pass(
            Category::ConversionTracking,
            item,
            "Auto-tagging is enabled; clicks carry a click identifier for conversion attribution.",
        ),
        Ok(false) => rec.record(
            Category::ConversionTracking,
            item,
            Severity::Fail,
            "Auto-tagging is disabled; conversions cannot be attributed to clicks reliably.",
            "Enable auto-tagging in account settings.",
        ),
        Err(e) => rec.unavailable(Category::ConversionTracking, item, ACCOUNT, &e),
    }
    Ok(())
}

/// TRK-002: Conversion actions
pub fn audit_conversion_actions(
    ctx: &AuditContext<'_>,
    rec: &mut Recorder,
) -> Result<(), AuditError> {
    let actions = match ctx.source.conversion_actions() {
        Ok(actions) => actions,
        Err(e) => {
            rec.unavailable(
                Category::ConversionTracking,
                "Conversion actions defined",
                ACCOUNT,
                &e,
            );
            return Ok(());
        }
    };

    let enabled: Vec<_> = actions
        .iter()
        .filter(|a| a.status == EntityStatus::Enabled)
        .collect();

    if enabled.is_empty() {
        rec.record(
            Category::ConversionTracking,
            "Conversion actions defined",
            Severity::Fail,
            format!(
                "No enabled conversion actions ({} defined in total); bidding and reporting have no conversion signal.",
                actions.len()
            ),
            "Create and enable at least one conversion action for the primary business goal.",
        );
    } else {
        rec.pass(
            Category::ConversionTracking,
            "Conversion actions defined",
            format!("{} enabled conversion action(s).", enabled.len()),
        );
    }

    let item = "Conversion action recording";
    let mut rollup = RollUp::new(item, "conversion actions");
    ctx.pacing.each(&enabled, |action| {
        let severity = if action.recent_conversions > 0.0 {
            rec.pass(
                Category::ConversionTracking,
                item,
                format!(
                    "Conversion action '{}' recorded {} conversion(s).",
                    action.name,
                    action.recent_conversions
                ),
            );
            Severity::Pass
        } else {
            rec.record(
                Category::ConversionTracking,
                item,
                Severity::Warn,
                format!(
                    "Conversion action '{}' recorded no conversions in the stats window.",
                    action.name
                ),
                format!("Verify the tag or import for '{}' is firing.", action.name),
            );
            Severity::Warn
        };
        rollup.tally(severity);
    });
    rollup.finish(rec, Category::ConversionTracking);

    Ok(())
}

/// ACC-001: Account settings
pub fn audit_account_settings(
    ctx: &AuditContext<'_>,
    rec: &mut Recorder,
) -> Result<(), AuditError> {
    let item = "Account settings";
    match ctx.source.account_info() {
        Ok(info) => rec.record(
            Category::AccountSettings,
            item,
            Severity::Info,
            format!(
                "Account '{}' ({}) reports in {} using time zone {}.",
                info.name,
                info.customer_id,
                info.currency_code,
                info.time_zone
            ),
            "Confirm currency and time zone match the business; neither can be changed later.",
        ),
        Err(e) => rec.unavailable(Category::AccountSettings, item, ACCOUNT, &e),
    }
    Ok(())
}
