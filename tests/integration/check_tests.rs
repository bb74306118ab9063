//! Check module integration tests.
//!
//! Each test shapes a mock account to trigger one rule and verifies the
//! findings that rule records.

use crate::mocks::{audit_only, findings_of, MockAdGroup, MockCampaign, MockSource};
use campaign_audit::source::{
    AdKind, ApprovalStatus, BiddingStrategy, ConversionAction, EntityStatus, GeoTargetType,
    MatchType,
};
use campaign_audit::{Finding, Severity};

fn summary<'a>(findings: &[&'a Finding]) -> &'a Finding {
    findings
        .iter()
        .copied()
        .find(|f| f.item.ends_with("(summary)"))
        .expect("roll-up finding present")
}

fn with_severity<'a>(findings: &[&'a Finding], severity: Severity) -> Vec<&'a Finding> {
    findings.iter().copied().filter(|f| f.severity == severity).collect()
}

// ============================================================================
// Campaign structure
// ============================================================================

#[test]
fn test_ad_group_count_below_minimum_fails() {
    let source = MockSource::empty()
        .with_campaign(MockCampaign::healthy("c1", "US-Solo-Search", 1))
        .with_campaign(MockCampaign::healthy("c2", "US-Wide-Search", 3));
    let run = audit_only(&source, &["STR-001"]);
    let findings = findings_of(&run, "STR-001");

    let fails = with_severity(&findings, Severity::Fail);
    assert_eq!(fails.len(), 1);
    assert_eq!(
        fails[0].details,
        "campaign 'US-Solo-Search' has 1 active ad group(s); at least 2 expected."
    );
    assert_eq!(run.report.critical.len(), 1);

    let passes = with_severity(&findings, Severity::Pass);
    assert_eq!(passes.len(), 1);
    assert!(passes[0].details.contains("US-Wide-Search"));

    let rollup = summary(&findings);
    assert_eq!(rollup.severity, Severity::Info);
    assert_eq!(rollup.item, "Active ad groups per campaign (summary)");
    assert!(rollup.details.starts_with("1 of 2 campaigns pass"));
    assert!(rollup.details.contains("1 flagged."));
}

#[test]
fn test_ad_group_without_keywords_fails() {
    let campaign = MockCampaign::healthy("c1", "US-Brand-Search", 1)
        .with_ad_group(MockAdGroup::healthy("c1-empty", "c1", "Empty").without_keywords());
    let run = audit_only(&MockSource::empty().with_campaign(campaign), &["STR-002"]);
    let findings = findings_of(&run, "STR-002");

    let fails = with_severity(&findings, Severity::Fail);
    assert_eq!(fails.len(), 1);
    assert!(fails[0].details.contains("ad group 'Empty'"));
    assert!(fails[0].details.contains("cannot serve"));
}

#[test]
fn test_failed_child_listing_is_one_finding_for_the_parent() {
    let source = MockSource::healthy()
        .with_campaign(MockCampaign::healthy("c2", "US-Generic-Search", 2))
        .fail("ad groups", "c1");
    let run = audit_only(&source, &["STR-001"]);
    let findings = findings_of(&run, "STR-001");

    let errors = with_severity(&findings, Severity::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].item, "Active ad groups per campaign");
    assert!(errors[0].details.contains("campaign 'US-Brand-Search'"));

    assert_eq!(with_severity(&findings, Severity::Pass).len(), 1);
    let rollup = summary(&findings);
    assert_eq!(rollup.severity, Severity::Info);
    assert!(rollup.details.contains("1 could not be fully evaluated."));
}

// ============================================================================
// Naming
// ============================================================================

#[test]
fn test_campaign_naming_flags_nonconforming_names() {
    let source = MockSource::healthy().with_campaign(MockCampaign::healthy("c2", "summer_sale", 2));
    let run = audit_only(&source, &["NAM-001"]);
    let findings = findings_of(&run, "NAM-001");

    let warns = with_severity(&findings, Severity::Warn);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].details.contains("summer_sale"));

    let passes = with_severity(&findings, Severity::Pass);
    assert_eq!(passes.len(), 1);
    assert!(passes[0].details.contains("US-Brand-Search"));
}

#[test]
fn test_paused_campaigns_are_named_too() {
    let mut paused = MockCampaign::healthy("c2", "old campaign", 2);
    paused.campaign.status = EntityStatus::Paused;
    let mut removed = MockCampaign::healthy("c3", "gone", 2);
    removed.campaign.status = EntityStatus::Removed;

    let source = MockSource::healthy().with_campaign(paused).with_campaign(removed);
    let run = audit_only(&source, &["NAM-001"]);
    let warns = with_severity(&findings_of(&run, "NAM-001"), Severity::Warn);

    assert_eq!(warns.len(), 1);
    assert!(warns[0].details.contains("old campaign"));
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_duplicate_keywords_within_a_campaign() {
    let mut campaign = MockCampaign::healthy("c1", "US-Brand-Search", 2);
    campaign.ad_groups[0] = campaign.ad_groups[0]
        .clone()
        .keyword("Running  Shoes", MatchType::Exact, Some(8))
        .keyword("running shoes", MatchType::Phrase, Some(8));
    campaign.ad_groups[1] = campaign.ad_groups[1]
        .clone()
        .keyword("running shoes", MatchType::Exact, Some(8));

    // Same text in another campaign is not compared
    let shoes = MockAdGroup::healthy("c2-g3", "c2", "Shoes").keyword(
        "running shoes",
        MatchType::Exact,
        Some(8),
    );
    let other = MockCampaign::healthy("c2", "UK-Brand-Search", 2).with_ad_group(shoes);

    let source = MockSource::empty().with_campaign(campaign).with_campaign(other);
    let run = audit_only(&source, &["KW-003"]);
    let findings = findings_of(&run, "KW-003");

    let warns = with_severity(&findings, Severity::Warn);
    assert_eq!(warns.len(), 1);
    assert_eq!(
        warns[0].details,
        "[exact] running shoes appears in 2 ad groups of campaign 'US-Brand-Search': 'Group 1', 'Group 2'."
    );

    let passes = with_severity(&findings, Severity::Pass);
    assert_eq!(passes.len(), 1);
    assert!(passes[0].details.contains("UK-Brand-Search"));

    let rollup = summary(&findings);
    assert_eq!(rollup.severity, Severity::Info);
    assert!(rollup.details.contains("Only ad groups within the same campaign are compared."));
}

#[test]
fn test_quality_score_findings_and_average() {
    let mut campaign = MockCampaign::healthy("c1", "US-Brand-Search", 2);
    campaign.ad_groups[0] = campaign.ad_groups[0]
        .clone()
        .keyword("cheap boots", MatchType::Phrase, Some(3))
        .keyword("new boots", MatchType::Phrase, None);

    let run = audit_only(&MockSource::empty().with_campaign(campaign), &["KW-001"]);
    let findings = findings_of(&run, "KW-001");

    let warns = with_severity(&findings, Severity::Warn);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].details.contains("'cheap boots'"));
    assert!(warns[0].details.contains("quality score 3 (minimum 5)"));

    let infos: Vec<_> = with_severity(&findings, Severity::Info)
        .into_iter()
        .filter(|f| !f.item.ends_with("(summary)"))
        .collect();
    assert_eq!(infos.len(), 1);
    assert!(infos[0].details.contains("no quality score yet"));

    // Six keywords at 8 plus one at 3
    let rollup = summary(&findings);
    assert!(rollup
        .details
        .contains("Average quality score 7.3 across 7 scored keyword(s)."));
}

#[test]
fn test_broad_match_under_manual_bidding() {
    let mut campaign = MockCampaign::healthy("c1", "US-Brand-Search", 1);
    campaign.bidding = BiddingStrategy::ManualCpc;
    campaign.ad_groups[0] = MockAdGroup::healthy("c1-g1", "c1", "Group 1")
        .without_keywords()
        .keyword("boots", MatchType::Broad, Some(7))
        .keyword("shoes", MatchType::Broad, Some(7))
        .keyword("sandals", MatchType::Exact, Some(7));

    let run = audit_only(&MockSource::empty().with_campaign(campaign), &["KW-002", "BUD-002"]);

    let kw = with_severity(&findings_of(&run, "KW-002"), Severity::Warn);
    assert_eq!(kw.len(), 1);
    assert!(kw[0].details.contains("Manual CPC"));
    assert!(kw[0].details.contains("66.7%"));

    let bidding = with_severity(&findings_of(&run, "BUD-002"), Severity::Warn);
    assert_eq!(bidding.len(), 1);
}

// ============================================================================
// Budget, targeting, extensions
// ============================================================================

#[test]
fn test_zero_budget_and_budget_loss_fail() {
    let mut campaign = MockCampaign::healthy("c1", "US-Brand-Search", 2);
    campaign.budget.daily_amount = 0.0;
    campaign.impression_share.lost_to_budget = 0.45;
    let run = audit_only(&MockSource::empty().with_campaign(campaign), &["BUD-001"]);
    let fails = with_severity(&findings_of(&run, "BUD-001"), Severity::Fail);

    let items: Vec<_> = fails.iter().map(|f| f.item.as_str()).collect();
    assert_eq!(items, vec!["Daily budget set", "Impression share lost to budget"]);
    assert!(fails[1].details.contains("45.0%"));
}

#[test]
fn test_unsupported_capability_is_info() {
    let source = MockSource::healthy().unsupported("geo target type");
    let run = audit_only(&source, &["TGT-002"]);
    let findings = findings_of(&run, "TGT-002");

    let method: Vec<_> = findings
        .iter()
        .filter(|f| f.item == "Location targeting method")
        .collect();
    assert_eq!(method.len(), 1);
    assert_eq!(method[0].severity, Severity::Info);
    assert!(method[0].details.contains("cannot be read from this data source"));

    // Location targets are still evaluated
    assert!(findings
        .iter()
        .any(|f| f.item == "Location targets" && f.severity == Severity::Pass));
    assert_eq!(run.report.totals.error, 0);
}

#[test]
fn test_location_targeting_rules() {
    let mut worldwide = MockCampaign::healthy("c1", "US-Brand-Search", 2);
    worldwide.locations.clear();
    worldwide.geo_target_type = GeoTargetType::PresenceOrInterest;

    let run = audit_only(&MockSource::empty().with_campaign(worldwide), &["TGT-002"]);
    let findings = findings_of(&run, "TGT-002");

    assert_eq!(with_severity(&findings, Severity::Fail)[0].item, "Location targets");
    assert_eq!(with_severity(&findings, Severity::Warn)[0].item, "Location targeting method");
}

#[test]
fn test_network_rule_ignores_non_search_campaigns() {
    let mut display = MockCampaign::healthy("c2", "US-Display-Prospecting", 2);
    display.campaign.channel = campaign_audit::source::Channel::Display;
    display.networks.display_network = true;

    let mut partners = MockCampaign::healthy("c3", "US-Generic-Search", 2);
    partners.networks.search_partners = true;

    let source = MockSource::healthy().with_campaign(display).with_campaign(partners);
    let run = audit_only(&source, &["TGT-001"]);
    let findings = findings_of(&run, "TGT-001");

    let warns = with_severity(&findings, Severity::Warn);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].details.contains("US-Generic-Search"));
    assert!(warns[0].details.contains("search partners"));
    assert!(findings.iter().all(|f| !f.details.contains("US-Display-Prospecting")));
}

#[test]
fn test_missing_extensions_warn() {
    let mut campaign = MockCampaign::healthy("c1", "US-Brand-Search", 2);
    campaign.extensions.sitelinks = 2;
    let run = audit_only(&MockSource::empty().with_campaign(campaign), &["EXT-001"]);
    let warns = with_severity(&findings_of(&run, "EXT-001"), Severity::Warn);

    assert_eq!(warns.len(), 1);
    assert_eq!(warns[0].item, "Sitelinks");
    assert!(warns[0].recommendation.contains("Add 2 more sitelink(s)"));
}

// ============================================================================
// Ads and landing pages
// ============================================================================

#[test]
fn test_ad_approval_and_strength() {
    let mut campaign = MockCampaign::healthy("c1", "US-Brand-Search", 1);
    campaign.ad_groups[0].ads[0].approval = ApprovalStatus::Disapproved;
    campaign.ad_groups[0].ads[1].approval = ApprovalStatus::ApprovedLimited;
    campaign.ad_groups[0].ads[1].ad.kind = AdKind::ExpandedText;

    let run = audit_only(&MockSource::empty().with_campaign(campaign), &["AD-001", "AD-002"]);

    let approval = findings_of(&run, "AD-001");
    assert_eq!(with_severity(&approval, Severity::Fail).len(), 1);
    assert_eq!(with_severity(&approval, Severity::Warn).len(), 1);
    assert_eq!(run.report.critical[0].item, "Ad approval");

    // Only the responsive search ad is rated
    let strength = findings_of(&run, "AD-002");
    let rated: Vec<_> = strength.iter().filter(|f| !f.item.ends_with("(summary)")).collect();
    assert_eq!(rated.len(), 1);
    assert!(summary(&strength).details.starts_with("1 of 1 responsive search ads pass"));
}

#[test]
fn test_unlisted_ad_group_is_not_counted_as_an_ad() {
    let source = MockSource::empty()
        .with_campaign(MockCampaign::healthy("c1", "US-Brand-Search", 2))
        .fail("ads", "c1-g1");
    let run = audit_only(&source, &["AD-001"]);
    let findings = findings_of(&run, "AD-001");

    let errors = with_severity(&findings, Severity::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].details.contains("ad group 'Group 1'"));

    let rollup = summary(&findings);
    assert_eq!(rollup.severity, Severity::Info);
    assert_eq!(
        rollup.details,
        "2 of 2 ads pass ad approval. The ads of 1 ad group(s) could not be listed."
    );
}

#[test]
fn test_final_url_rules() {
    let mut campaign = MockCampaign::healthy("c1", "US-Brand-Search", 1);
    campaign.ad_groups[0].ads[0].final_urls = vec!["http://shop.example/boots".to_string()];
    campaign.ad_groups[0].ads[1].final_urls = vec!["  ".to_string()];

    let run = audit_only(&MockSource::empty().with_campaign(campaign), &["LP-001"]);
    let findings = findings_of(&run, "LP-001");

    let warns = with_severity(&findings, Severity::Warn);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].details.contains("http://shop.example/boots"));
    assert_eq!(with_severity(&findings, Severity::Fail).len(), 1);
}

// ============================================================================
// Performance and tracking
// ============================================================================

#[test]
fn test_performance_rules() {
    let mut expensive = MockCampaign::healthy("c1", "US-Brand-Search", 2);
    expensive.stats.cost = 5_000.0;
    expensive.stats.conversions = 10.0;

    let mut quiet = MockCampaign::healthy("c2", "US-Niche-Search", 2);
    quiet.stats.impressions = 40;
    quiet.stats.clicks = 2;
    quiet.stats.conversions = 0.0;

    let source = MockSource::empty().with_campaign(expensive).with_campaign(quiet);
    let run = audit_only(&source, &["PERF-001"]);
    let findings = findings_of(&run, "PERF-001");

    let fails = with_severity(&findings, Severity::Fail);
    assert_eq!(fails.len(), 1);
    assert_eq!(fails[0].item, "Cost per conversion");
    assert!(fails[0].details.contains("500.00 per conversion"));

    assert!(findings.iter().any(|f| f.item == "Spend without conversions"
        && f.severity == Severity::Warn
        && f.details.contains("US-Niche-Search")));
    assert!(findings.iter().any(|f| f.item == "Click-through rate"
        && f.severity == Severity::Info
        && f.details.contains("40 impressions")));
}

#[test]
fn test_conversion_tracking_failures() {
    let mut source = MockSource::healthy();
    source.auto_tagging = false;
    source.conversion_actions = vec![ConversionAction {
        name: "Old lead form".to_string(),
        status: EntityStatus::Paused,
        recent_conversions: 0.0,
    }];

    let run = audit_only(&source, &["TRK-001", "TRK-002"]);

    let tagging = findings_of(&run, "TRK-001");
    assert_eq!(tagging.len(), 1);
    assert_eq!(tagging[0].severity, Severity::Fail);

    let actions = findings_of(&run, "TRK-002");
    assert_eq!(actions[0].item, "Conversion actions defined");
    assert_eq!(actions[0].severity, Severity::Fail);
    assert!(actions[0].details.contains("1 defined in total"));
    assert_eq!(summary(&actions).severity, Severity::Info);

    assert_eq!(run.report.critical.len(), 2);
}

#[test]
fn test_manual_items_are_info() {
    let run = audit_only(&MockSource::empty(), &["MAN-001"]);
    let findings = findings_of(&run, "MAN-001");

    let items: Vec<_> = findings.iter().map(|f| f.item.as_str()).collect();
    assert_eq!(items, vec!["Audience segments", "Remarketing lists", "Brand safety"]);
    assert!(findings.iter().all(|f| f.severity == Severity::Info));
    assert!(findings.iter().all(|f| f.details.starts_with("Manual review required")));
}
