//! JSON account snapshot data source.
//!
//! Serves the full hierarchy from a previously exported JSON document. Any
//! attribute missing from the document surfaces as
//! `AccessError::Unavailable`, so partial exports still audit cleanly.

use super::{
    AccessError, AccountInfo, AccountLevel, AdGroupLevel, AdGroupRef, AdKind, AdLevel, AdRef,
    AdStrength, ApprovalStatus, BiddingStrategy, Budget, CampaignLevel, CampaignRef, Channel,
    ConversionAction, EntityStatus, ExtensionCounts, Fetch, GeoTargetType, ImpressionShare,
    KeywordLevel, KeywordRef, LocationTarget, MatchType, NetworkSettings, ScheduleSlot, Stats,
    StatusFilter,
};
use crate::AuditError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const MISSING: &str = "not present in snapshot";

#[derive(Debug, Default, Deserialize)]
struct AccountSnapshot {
    #[serde(default)]
    account: Option<AccountInfo>,
    #[serde(default)]
    auto_tagging: Option<bool>,
    #[serde(default)]
    conversion_actions: Option<Vec<ConversionAction>>,
    #[serde(default)]
    campaigns: Vec<CampaignSnapshot>,
}

#[derive(Debug, Deserialize)]
struct CampaignSnapshot {
    id: String,
    name: String,
    #[serde(default)]
    status: EntityStatus,
    #[serde(default)]
    channel: Channel,
    #[serde(default)]
    budget: Option<Budget>,
    #[serde(default)]
    bidding_strategy: Option<BiddingStrategy>,
    #[serde(default)]
    networks: Option<NetworkSettings>,
    #[serde(default)]
    locations: Option<Vec<LocationTarget>>,
    #[serde(default)]
    geo_target_type: Option<GeoTargetType>,
    #[serde(default)]
    schedule: Option<Vec<ScheduleSlot>>,
    #[serde(default)]
    negative_keywords: Option<Vec<String>>,
    #[serde(default)]
    stats: Option<Stats>,
    #[serde(default)]
    impression_share: Option<ImpressionShare>,
    #[serde(default)]
    extensions: Option<ExtensionCounts>,
    #[serde(default)]
    ad_groups: Vec<AdGroupSnapshot>,
}

#[derive(Debug, Deserialize)]
struct AdGroupSnapshot {
    id: String,
    name: String,
    #[serde(default)]
    status: EntityStatus,
    #[serde(default)]
    keywords: Vec<KeywordSnapshot>,
    #[serde(default)]
    ads: Vec<AdSnapshot>,
}

#[derive(Debug, Deserialize)]
struct KeywordSnapshot {
    id: String,
    text: String,
    match_type: MatchType,
    #[serde(default)]
    status: EntityStatus,
    /// Absent means the platform has not scored the keyword yet
    #[serde(default)]
    quality_score: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct AdSnapshot {
    id: String,
    #[serde(default)]
    kind: AdKind,
    #[serde(default)]
    status: EntityStatus,
    #[serde(default)]
    approval: Option<ApprovalStatus>,
    #[serde(default)]
    strength: Option<AdStrength>,
    #[serde(default)]
    final_urls: Option<Vec<String>>,
}

/// Data source backed by a JSON snapshot.
pub struct SnapshotSource {
    snapshot: AccountSnapshot,
    /// ad group id -> (campaign index, ad group index)
    ad_group_index: HashMap<String, (usize, usize)>,
}

impl SnapshotSource {
    /// Load a snapshot from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| AuditError::Io {
            context: format!("reading snapshot {}", path.display()),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, AuditError> {
        let snapshot: AccountSnapshot =
            serde_json::from_str(raw).map_err(|source| AuditError::Json {
                context: "account snapshot".to_string(),
                source,
            })?;

        let mut ad_group_index = HashMap::new();
        for (ci, campaign) in snapshot.campaigns.iter().enumerate() {
            for (gi, group) in campaign.ad_groups.iter().enumerate() {
                ad_group_index.insert(group.id.clone(), (ci, gi));
            }
        }

        tracing::debug!(
            campaigns = snapshot.campaigns.len(),
            ad_groups = ad_group_index.len(),
            "loaded account snapshot"
        );

        Ok(SnapshotSource {
            snapshot,
            ad_group_index,
        })
    }

    fn campaign(&self, campaign: &CampaignRef) -> Fetch<&CampaignSnapshot> {
        self.snapshot
            .campaigns
            .iter()
            .find(|c| c.id == campaign.id)
            .ok_or_else(|| {
                AccessError::unavailable("campaign", format!("unknown campaign id {}", campaign.id))
            })
    }

    fn ad_group(&self, id: &str) -> Fetch<&AdGroupSnapshot> {
        self.ad_group_index
            .get(id)
            .map(|&(ci, gi)| &self.snapshot.campaigns[ci].ad_groups[gi])
            .ok_or_else(|| {
                AccessError::unavailable("ad group", format!("unknown ad group id {}", id))
            })
    }

    fn ad(&self, ad: &AdRef) -> Fetch<&AdSnapshot> {
        self.ad_group(&ad.ad_group_id)?
            .ads
            .iter()
            .find(|a| a.id == ad.id)
            .ok_or_else(|| AccessError::unavailable("ad", format!("unknown ad id {}", ad.id)))
    }
}

fn present<T: Clone>(value: &Option<T>, attribute: &str) -> Fetch<T> {
    value
        .clone()
        .ok_or_else(|| AccessError::unavailable(attribute, MISSING))
}

impl AccountLevel for SnapshotSource {
    fn account_info(&self) -> Fetch<AccountInfo> {
        present(&self.snapshot.account, "account info")
    }

    fn auto_tagging_enabled(&self) -> Fetch<bool> {
        present(&self.snapshot.auto_tagging, "auto-tagging")
    }

    fn conversion_actions(&self) -> Fetch<Vec<ConversionAction>> {
        present(&self.snapshot.conversion_actions, "conversion actions")
    }
}

impl CampaignLevel for SnapshotSource {
    fn campaigns(&self, filter: StatusFilter) -> Fetch<Vec<CampaignRef>> {
        Ok(self
            .snapshot
            .campaigns
            .iter()
            .filter(|c| filter.admits(c.status))
            .map(|c| CampaignRef {
                id: c.id.clone(),
                name: c.name.clone(),
                status: c.status,
                channel: c.channel,
            })
            .collect())
    }

    fn budget(&self, campaign: &CampaignRef) -> Fetch<Budget> {
        present(&self.campaign(campaign)?.budget, "budget")
    }

    fn bidding_strategy(&self, campaign: &CampaignRef) -> Fetch<BiddingStrategy> {
        present(&self.campaign(campaign)?.bidding_strategy, "bidding strategy")
    }

    fn network_settings(&self, campaign: &CampaignRef) -> Fetch<NetworkSettings> {
        present(&self.campaign(campaign)?.networks, "network settings")
    }

    fn location_targets(&self, campaign: &CampaignRef) -> Fetch<Vec<LocationTarget>> {
        present(&self.campaign(campaign)?.locations, "location targets")
    }

    fn negative_keywords(&self, campaign: &CampaignRef) -> Fetch<Vec<String>> {
        present(&self.campaign(campaign)?.negative_keywords, "negative keywords")
    }

    fn campaign_stats(&self, campaign: &CampaignRef) -> Fetch<Stats> {
        present(&self.campaign(campaign)?.stats, "campaign stats")
    }

    fn extensions(&self, campaign: &CampaignRef) -> Fetch<ExtensionCounts> {
        present(&self.campaign(campaign)?.extensions, "extensions")
    }

    fn geo_target_type(&self, campaign: &CampaignRef) -> Fetch<GeoTargetType> {
        present(&self.campaign(campaign)?.geo_target_type, "geo target type")
    }

    fn ad_schedule(&self, campaign: &CampaignRef) -> Fetch<Vec<ScheduleSlot>> {
        present(&self.campaign(campaign)?.schedule, "ad schedule")
    }

    fn impression_share(&self, campaign: &CampaignRef) -> Fetch<ImpressionShare> {
        present(&self.campaign(campaign)?.impression_share, "impression share")
    }
}

impl AdGroupLevel for SnapshotSource {
    fn ad_groups(&self, campaign: &CampaignRef, filter: StatusFilter) -> Fetch<Vec<AdGroupRef>> {
        Ok(self
            .campaign(campaign)?
            .ad_groups
            .iter()
            .filter(|g| filter.admits(g.status))
            .map(|g| AdGroupRef {
                id: g.id.clone(),
                campaign_id: campaign.id.clone(),
                name: g.name.clone(),
                status: g.status,
            })
            .collect())
    }
}

impl KeywordLevel for SnapshotSource {
    fn keywords(&self, ad_group: &AdGroupRef, filter: StatusFilter) -> Fetch<Vec<KeywordRef>> {
        Ok(self
            .ad_group(&ad_group.id)?
            .keywords
            .iter()
            .filter(|k| filter.admits(k.status))
            .map(|k| KeywordRef {
                id: k.id.clone(),
                ad_group_id: ad_group.id.clone(),
                text: k.text.clone(),
                match_type: k.match_type,
                status: k.status,
            })
            .collect())
    }

    fn quality_score(&self, keyword: &KeywordRef) -> Fetch<Option<u8>> {
        self.ad_group(&keyword.ad_group_id)?
            .keywords
            .iter()
            .find(|k| k.id == keyword.id)
            .map(|k| k.quality_score)
            .ok_or_else(|| {
                AccessError::unavailable("keyword", format!("unknown keyword id {}", keyword.id))
            })
    }
}

impl AdLevel for SnapshotSource {
    fn ads(&self, ad_group: &AdGroupRef, filter: StatusFilter) -> Fetch<Vec<AdRef>> {
        Ok(self
            .ad_group(&ad_group.id)?
            .ads
            .iter()
            .filter(|a| filter.admits(a.status))
            .map(|a| AdRef {
                id: a.id.clone(),
                ad_group_id: ad_group.id.clone(),
                kind: a.kind,
                status: a.status,
            })
            .collect())
    }

    fn approval_status(&self, ad: &AdRef) -> Fetch<ApprovalStatus> {
        present(&self.ad(ad)?.approval, "approval status")
    }

    fn final_urls(&self, ad: &AdRef) -> Fetch<Vec<String>> {
        present(&self.ad(ad)?.final_urls, "final URLs")
    }

    fn ad_strength(&self, ad: &AdRef) -> Fetch<AdStrength> {
        present(&self.ad(ad)?.strength, "ad strength")
    }
}
