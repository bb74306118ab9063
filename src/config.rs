//! Audit configuration.
//!
//! Loaded from an optional TOML file with three tables:
//! - `[thresholds]`: numeric limits consumed by check modules
//! - `[naming]`: campaign and ad group naming patterns (regular expressions)
//! - `[run]`: module selection, parallelism, time budget and pacing
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Precedence: CLI flags > config file > defaults.

use crate::engine::pacing::Pacing;
use crate::{AuditError, Category};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CAMPAIGN_PATTERN: &str = r"^[A-Z]{2,}-[A-Za-z0-9]+-.+$";
pub const DEFAULT_AD_GROUP_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9 _&+-]*$";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    pub thresholds: Thresholds,
    pub naming: NamingRules,
    pub run: RunSettings,
}

/// Numeric limits. Proportions are expressed in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    pub min_quality_score: u8,
    /// Maximum acceptable cost per conversion, account currency
    pub max_cpa: f64,
    pub min_ctr: f64,
    /// CTR is only judged above this many impressions
    pub min_impressions_for_ctr: u64,
    pub max_lost_is_budget: f64,
    pub max_lost_is_rank: f64,
    pub min_active_ad_groups: usize,
    pub max_active_ad_groups: usize,
    pub min_keywords_per_ad_group: usize,
    pub max_keywords_per_ad_group: usize,
    pub min_ads_per_ad_group: usize,
    pub max_broad_match_share: f64,
    pub min_sitelinks: u32,
    pub min_callouts: u32,
    pub min_structured_snippets: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            min_quality_score: 5,
            max_cpa: 100.0,
            min_ctr: 0.02,
            min_impressions_for_ctr: 100,
            max_lost_is_budget: 0.2,
            max_lost_is_rank: 0.3,
            min_active_ad_groups: 2,
            max_active_ad_groups: 20,
            min_keywords_per_ad_group: 3,
            max_keywords_per_ad_group: 20,
            min_ads_per_ad_group: 2,
            max_broad_match_share: 0.5,
            min_sitelinks: 4,
            min_callouts: 4,
            min_structured_snippets: 1,
        }
    }
}

impl Thresholds {
    /// Reject bounds that can never be satisfied.
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.min_active_ad_groups > self.max_active_ad_groups {
            return Err(AuditError::Config(format!(
                "min_active_ad_groups ({}) exceeds max_active_ad_groups ({})",
                self.min_active_ad_groups, self.max_active_ad_groups
            )));
        }
        if self.min_keywords_per_ad_group > self.max_keywords_per_ad_group {
            return Err(AuditError::Config(format!(
                "min_keywords_per_ad_group ({}) exceeds max_keywords_per_ad_group ({})",
                self.min_keywords_per_ad_group, self.max_keywords_per_ad_group
            )));
        }
        for (name, value) in [
            ("min_ctr", self.min_ctr),
            ("max_lost_is_budget", self.max_lost_is_budget),
            ("max_lost_is_rank", self.max_lost_is_rank),
            ("max_broad_match_share", self.max_broad_match_share),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AuditError::Config(format!(
                    "{} must be a proportion between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// A compiled naming validator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamingPattern(Regex);

impl NamingPattern {
    pub fn new(pattern: &str) -> Result<Self, AuditError> {
        Regex::new(pattern)
            .map(NamingPattern)
            .map_err(|e| AuditError::Pattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.0.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NamingPattern {
    type Error = AuditError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NamingPattern::new(&value)
    }
}

impl From<NamingPattern> for String {
    fn from(pattern: NamingPattern) -> Self {
        pattern.0.as_str().to_string()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingRules {
    pub campaign_pattern: NamingPattern,
    pub ad_group_pattern: NamingPattern,
}

impl Default for NamingRules {
    fn default() -> Self {
        NamingRules {
            campaign_pattern: NamingPattern(
                Regex::new(DEFAULT_CAMPAIGN_PATTERN).expect("default campaign pattern compiles"),
            ),
            ad_group_pattern: NamingPattern(
                Regex::new(DEFAULT_AD_GROUP_PATTERN).expect("default ad group pattern compiles"),
            ),
        }
    }
}

/// Execution settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunSettings {
    /// Run modules on a thread pool
    pub parallel: bool,
    pub max_parallel: usize,
    /// Wall-clock budget; remaining modules are skipped once exceeded
    pub time_budget_secs: Option<u64>,
    /// Module ids to run (empty = all)
    pub only: Vec<String>,
    /// Categories to run (empty = all)
    pub categories: Vec<Category>,
    /// Module ids reported as Skipped instead of running
    pub disabled: Vec<String>,
    pub pacing: Pacing,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            parallel: false,
            max_parallel: 4,
            time_budget_secs: None,
            only: Vec::new(),
            categories: Vec::new(),
            disabled: Vec::new(),
            pacing: Pacing::default(),
        }
    }
}

impl AuditConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, AuditError> {
        let config: AuditConfig = toml::from_str(raw).map_err(|e| AuditError::Toml {
            context: "audit configuration".to_string(),
            message: e.to_string(),
        })?;
        config.thresholds.validate()?;
        Ok(config)
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AuditConfig, AuditError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| AuditError::Io {
        context: format!("reading config {}", path.display()),
        source,
    })?;
    let config = AuditConfig::from_toml_str(&raw)?;
    tracing::debug!(path = %path.display(), "loaded audit configuration");
    Ok(config)
}
