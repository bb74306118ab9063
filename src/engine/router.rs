//! Category label to report section routing.
//!
//! The table is static and total over the known category labels. Anything
//! else lands in the fallback section instead of being dropped.

/// Section that receives findings whose category label is unknown.
pub const FALLBACK_SECTION: &str = "Manual Review";

const ROUTES: &[(&str, &str)] = &[
    ("conversion_tracking", "Conversion Tracking"),
    ("budget_bidding", "Budget & Bidding"),
    ("performance", "Performance"),
    ("keywords", "Keywords"),
    ("ads", "Ads"),
    ("campaign_structure", "Campaign Structure"),
    ("targeting", "Targeting"),
    ("extensions", "Extensions"),
    ("landing_pages", "Landing Pages"),
    ("account_settings", "Account Settings"),
    ("naming", "Naming Conventions"),
    ("audiences", "Audiences"),
    ("manual_review", FALLBACK_SECTION),
];

/// Resolve the report section for a category label.
pub fn section_for(label: &str) -> &'static str {
    ROUTES
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, section)| *section)
        .unwrap_or(FALLBACK_SECTION)
}

/// Machine label for free text naming a category either by its label
/// (any case, `-` or ` ` for `_`) or by its section name.
pub fn resolve(text: &str) -> Option<&'static str> {
    let text = text.trim();
    let slug = text.to_ascii_lowercase().replace(['-', ' '], "_");
    ROUTES
        .iter()
        .find(|(label, section)| *label == slug || section.eq_ignore_ascii_case(text))
        .map(|(label, _)| *label)
}

/// True when the label has its own entry in the routing table.
pub fn is_routed(label: &str) -> bool {
    ROUTES.iter().any(|(known, _)| *known == label)
}
