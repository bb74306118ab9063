//! Checklist items that cannot be verified mechanically (MAN-001).

use crate::engine::collector::Recorder;
use crate::engine::orchestrator::AuditContext;
use crate::{AuditError, Category};

/// (rule, what to check, where)
const MANUAL_ITEMS: &[(&str, &str, &str)] = &[
    (
        "Audience segments",
        "audience segments attached to each campaign and whether they are set to observation or targeting",
        "the Audiences page of each campaign",
    ),
    (
        "Remarketing lists",
        "remarketing list membership, duration and exclusion of converted users",
        "Audience manager",
    ),
    (
        "Brand safety",
        "placement exclusions and content suitability settings",
        "account-level content suitability settings",
    ),
];

/// MAN-001: Manual review items
pub fn audit_manual_items(_ctx: &AuditContext<'_>, rec: &mut Recorder) -> Result<(), AuditError> {
    for (item, what, location) in MANUAL_ITEMS {
        rec.manual(Category::Audiences, *item, what, location);
    }
    Ok(())
}
