//! Data source abstraction layer.
//!
//! Provides a capability interface per entity level:
//! - Account: identity, auto-tagging, conversion actions
//! - Campaign: listing plus budget, bidding, targeting, stats, extensions
//! - Ad group: listing per campaign
//! - Keyword: listing per ad group, quality score
//! - Ad: listing per ad group, approval, strength, final URLs
//!
//! # Graceful Degradation
//!
//! Every accessor returns a [`Fetch`] scoped to that one call:
//! - Read failed: `AccessError::Unavailable` with the reason
//! - Capability absent in this context: `AccessError::Unsupported`
//!
//! Optional capabilities have default methods returning `Unsupported`, so a
//! source only implements what it can actually serve. A failed accessor never
//! affects the result of any other accessor.

pub mod snapshot;

pub use snapshot::SnapshotSource;

use serde::{Deserialize, Serialize};

/// Result of a single accessor call.
pub type Fetch<T> = Result<T, AccessError>;

/// Per-accessor failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The read was attempted and failed
    #[error("{attribute} unavailable: {reason}")]
    Unavailable { attribute: String, reason: String },
    /// The source cannot provide this attribute in this context
    #[error("{attribute} is not supported by this data source")]
    Unsupported { attribute: String },
}

impl AccessError {
    pub fn unavailable(attribute: &str, reason: impl Into<String>) -> Self {
        AccessError::Unavailable {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(attribute: &str) -> Self {
        AccessError::Unsupported {
            attribute: attribute.to_string(),
        }
    }

    /// Name of the attribute whose read failed.
    pub fn attribute(&self) -> &str {
        match self {
            AccessError::Unavailable { attribute, .. } | AccessError::Unsupported { attribute } => {
                attribute
            }
        }
    }
}

/// Status predicate for child listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Enabled entities only
    #[default]
    Enabled,
    /// Enabled or paused, excluding removed
    EnabledOrPaused,
    /// Everything the source knows about
    All,
}

impl StatusFilter {
    pub fn admits(self, status: EntityStatus) -> bool {
        match self {
            StatusFilter::Enabled => status == EntityStatus::Enabled,
            StatusFilter::EnabledOrPaused => status != EntityStatus::Removed,
            StatusFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[default]
    Enabled,
    Paused,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub customer_id: String,
    pub name: String,
    pub currency_code: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionAction {
    pub name: String,
    #[serde(default)]
    pub status: EntityStatus,
    /// Conversions recorded in the stats window
    #[serde(default)]
    pub recent_conversions: f64,
}

/// Advertising channel of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Search,
    Display,
    Shopping,
    Video,
    PerformanceMax,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub channel: Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdGroupRef {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Phrase,
    Broad,
}

impl MatchType {
    pub fn label(self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Phrase => "phrase",
            MatchType::Broad => "broad",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRef {
    pub id: String,
    pub ad_group_id: String,
    pub text: String,
    pub match_type: MatchType,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdKind {
    #[default]
    ResponsiveSearch,
    ExpandedText,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRef {
    pub id: String,
    pub ad_group_id: String,
    #[serde(default)]
    pub kind: AdKind,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Daily amount in account currency
    pub daily_amount: f64,
    #[serde(default)]
    pub shared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiddingStrategy {
    ManualCpc,
    EnhancedCpc,
    MaximizeClicks,
    MaximizeConversions,
    MaximizeConversionValue,
    TargetCpa,
    TargetRoas,
    TargetImpressionShare,
    Other(String),
}

impl BiddingStrategy {
    /// Manual strategies leave bids to the advertiser.
    pub fn is_manual(&self) -> bool {
        matches!(self, BiddingStrategy::ManualCpc)
    }

    pub fn label(&self) -> String {
        match self {
            BiddingStrategy::ManualCpc => "Manual CPC".to_string(),
            BiddingStrategy::EnhancedCpc => "Enhanced CPC".to_string(),
            BiddingStrategy::MaximizeClicks => "Maximize clicks".to_string(),
            BiddingStrategy::MaximizeConversions => "Maximize conversions".to_string(),
            BiddingStrategy::MaximizeConversionValue => "Maximize conversion value".to_string(),
            BiddingStrategy::TargetCpa => "Target CPA".to_string(),
            BiddingStrategy::TargetRoas => "Target ROAS".to_string(),
            BiddingStrategy::TargetImpressionShare => "Target impression share".to_string(),
            BiddingStrategy::Other(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub search_partners: bool,
    pub display_network: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTarget {
    pub name: String,
    #[serde(default)]
    pub negative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoTargetType {
    /// People in the targeted locations
    Presence,
    /// People in, or interested in, the targeted locations
    PresenceOrInterest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub day: String,
    pub start_hour: u8,
    pub end_hour: u8,
}

/// Performance statistics over the source's stats window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub impressions: u64,
    pub clicks: u64,
    pub cost: f64,
    pub conversions: f64,
}

impl Stats {
    pub fn ctr(&self) -> Option<f64> {
        (self.impressions > 0).then(|| self.clicks as f64 / self.impressions as f64)
    }

    pub fn cpa(&self) -> Option<f64> {
        (self.conversions > 0.0).then(|| self.cost / self.conversions)
    }
}

/// Share of eligible impressions lost, as proportions in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpressionShare {
    pub lost_to_budget: f64,
    pub lost_to_rank: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtensionCounts {
    #[serde(default)]
    pub sitelinks: u32,
    #[serde(default)]
    pub callouts: u32,
    #[serde(default)]
    pub structured_snippets: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Approved,
    ApprovedLimited,
    UnderReview,
    Disapproved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdStrength {
    Pending,
    Poor,
    Average,
    Good,
    Excellent,
}

/// Account-level capabilities.
pub trait AccountLevel {
    fn account_info(&self) -> Fetch<AccountInfo>;
    fn auto_tagging_enabled(&self) -> Fetch<bool>;
    fn conversion_actions(&self) -> Fetch<Vec<ConversionAction>>;
}

/// Campaign-level capabilities.
pub trait CampaignLevel {
    fn campaigns(&self, filter: StatusFilter) -> Fetch<Vec<CampaignRef>>;
    fn budget(&self, campaign: &CampaignRef) -> Fetch<Budget>;
    fn bidding_strategy(&self, campaign: &CampaignRef) -> Fetch<BiddingStrategy>;
    fn network_settings(&self, campaign: &CampaignRef) -> Fetch<NetworkSettings>;
    fn location_targets(&self, campaign: &CampaignRef) -> Fetch<Vec<LocationTarget>>;
    fn negative_keywords(&self, campaign: &CampaignRef) -> Fetch<Vec<String>>;
    fn campaign_stats(&self, campaign: &CampaignRef) -> Fetch<Stats>;
    fn extensions(&self, campaign: &CampaignRef) -> Fetch<ExtensionCounts>;

    fn geo_target_type(&self, _campaign: &CampaignRef) -> Fetch<GeoTargetType> {
        Err(AccessError::unsupported("geo target type"))
    }

    fn ad_schedule(&self, _campaign: &CampaignRef) -> Fetch<Vec<ScheduleSlot>> {
        Err(AccessError::unsupported("ad schedule"))
    }

    fn impression_share(&self, _campaign: &CampaignRef) -> Fetch<ImpressionShare> {
        Err(AccessError::unsupported("impression share"))
    }
}

/// Ad group-level capabilities.
pub trait AdGroupLevel {
    fn ad_groups(&self, campaign: &CampaignRef, filter: StatusFilter) -> Fetch<Vec<AdGroupRef>>;
}

/// Keyword-level capabilities.
pub trait KeywordLevel {
    fn keywords(&self, ad_group: &AdGroupRef, filter: StatusFilter) -> Fetch<Vec<KeywordRef>>;

    /// `Ok(None)` when the platform has not scored the keyword yet.
    fn quality_score(&self, _keyword: &KeywordRef) -> Fetch<Option<u8>> {
        Err(AccessError::unsupported("quality score"))
    }
}

/// Ad-level capabilities.
pub trait AdLevel {
    fn ads(&self, ad_group: &AdGroupRef, filter: StatusFilter) -> Fetch<Vec<AdRef>>;
    fn approval_status(&self, ad: &AdRef) -> Fetch<ApprovalStatus>;
    fn final_urls(&self, ad: &AdRef) -> Fetch<Vec<String>>;

    fn ad_strength(&self, _ad: &AdRef) -> Fetch<AdStrength> {
        Err(AccessError::unsupported("ad strength"))
    }
}

/// Complete read interface consumed by the check modules.
pub trait DataSource:
    AccountLevel + CampaignLevel + AdGroupLevel + KeywordLevel + AdLevel + Send + Sync
{
}

impl<T> DataSource for T where
    T: AccountLevel + CampaignLevel + AdGroupLevel + KeywordLevel + AdLevel + Send + Sync
{
}
