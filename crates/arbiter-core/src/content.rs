//! Per-category economic and XP parameters.
//!
//! The table is built once (defaults plus optional overrides), checked, and
//! then shared read-only. Fractions are scaled by [`SCALE`]; XP factors too.
//!
//! | Content type               | Mint | Reward pool | Operator | Active | Passive | Base XP |
//! |----------------------------|------|-------------|----------|--------|---------|---------|
//! | `org_initial_story_standard` | 10 | 0.30        | 0.10     | 0.80   | 0.20    | 100     |
//! | `org_initial_story_premium`  | 25 | 0.35        | 0.10     | 0.80   | 0.20    | 120     |
//! | `org_completion_paid`        | 15 | 0.30        | 0.10     | 0.70   | 0.30    | 150     |
//! | `org_completion_free`        | 0  | 0           | 0        | 0      | 0       | 80      |
//! | `individual_initial_story`   | 0  | 0           | 0        | 0      | 0       | 50      |
//! | `individual_completion`      | 0  | 0           | 0        | 0      | 0       | 50      |
//!
//! Individual-creator economics are priced elsewhere, so their rows stay zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::SCALE;
use crate::error::ConfigError;
use crate::fixed;

/// Category of moderated content.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    OrgInitialStoryStandard,
    OrgInitialStoryPremium,
    OrgCompletionPaid,
    OrgCompletionFree,
    IndividualInitialStory,
    IndividualCompletion,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        Self::OrgInitialStoryStandard,
        Self::OrgInitialStoryPremium,
        Self::OrgCompletionPaid,
        Self::OrgCompletionFree,
        Self::IndividualInitialStory,
        Self::IndividualCompletion,
    ];

    /// Stable identifier used in config files and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::OrgInitialStoryStandard => "org_initial_story_standard",
            Self::OrgInitialStoryPremium => "org_initial_story_premium",
            Self::OrgCompletionPaid => "org_completion_paid",
            Self::OrgCompletionFree => "org_completion_free",
            Self::IndividualInitialStory => "individual_initial_story",
            Self::IndividualCompletion => "individual_completion",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::OrgInitialStoryStandard => 0,
            Self::OrgInitialStoryPremium => 1,
            Self::OrgCompletionPaid => 2,
            Self::OrgCompletionFree => 3,
            Self::IndividualInitialStory => 4,
            Self::IndividualCompletion => 5,
        }
    }

    pub fn default_economics(self) -> ContentTypeConfig {
        match self {
            Self::OrgInitialStoryStandard => ContentTypeConfig {
                mint_price_reference: 10 * SCALE,
                reward_pool_fraction: pct(30),
                operator_fraction: pct(10),
                active_pool_fraction: pct(80),
                passive_pool_fraction: pct(20),
            },
            Self::OrgInitialStoryPremium => ContentTypeConfig {
                mint_price_reference: 25 * SCALE,
                reward_pool_fraction: pct(35),
                operator_fraction: pct(10),
                active_pool_fraction: pct(80),
                passive_pool_fraction: pct(20),
            },
            Self::OrgCompletionPaid => ContentTypeConfig {
                mint_price_reference: 15 * SCALE,
                reward_pool_fraction: pct(30),
                operator_fraction: pct(10),
                active_pool_fraction: pct(70),
                passive_pool_fraction: pct(30),
            },
            Self::OrgCompletionFree | Self::IndividualInitialStory | Self::IndividualCompletion => {
                ContentTypeConfig::default()
            }
        }
    }

    pub fn default_xp(self) -> XpConfig {
        let base_xp = match self {
            Self::OrgInitialStoryStandard => 100,
            Self::OrgInitialStoryPremium => 120,
            Self::OrgCompletionPaid => 150,
            Self::OrgCompletionFree => 80,
            Self::IndividualInitialStory | Self::IndividualCompletion => 50,
        };
        XpConfig {
            base_xp,
            minority_factor: pct(25),
            passive_factor: pct(50),
        }
    }
}

const fn pct(p: u128) -> u128 {
    p * SCALE / 100
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ContentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or_else(|| ConfigError::Parse(format!("unknown content type: {s}")))
    }
}

/// Monetary parameters of one content type.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentTypeConfig {
    /// List mint price for this type. Callers use it when an item carries no
    /// price of its own; evaluation and pools read the snapshot's price.
    #[serde(with = "fixed::decimal")]
    pub mint_price_reference: u128,
    /// Share of the price that funds the reward pool.
    #[serde(with = "fixed::decimal")]
    pub reward_pool_fraction: u128,
    /// Share of the price retained by the operator.
    #[serde(with = "fixed::decimal")]
    pub operator_fraction: u128,
    /// Share of the reward pool paid to active voters.
    #[serde(with = "fixed::decimal")]
    pub active_pool_fraction: u128,
    /// Share of the reward pool paid to passive stakers.
    #[serde(with = "fixed::decimal")]
    pub passive_pool_fraction: u128,
}

impl ContentTypeConfig {
    /// Whether any tokens move for this content type. Free content only
    /// awards XP.
    pub fn is_monetized(&self) -> bool {
        self.reward_pool_fraction > 0
    }

    pub fn check(&self, content_type: ContentType) -> Result<(), ConfigError> {
        let price_split = fixed::checked_add(self.reward_pool_fraction, self.operator_fraction)
            .unwrap_or(u128::MAX);
        if price_split > SCALE {
            return Err(ConfigError::FractionOverflow {
                content_type,
                field: "reward_pool + operator",
                sum: price_split,
            });
        }
        let pool_split = fixed::checked_add(self.active_pool_fraction, self.passive_pool_fraction)
            .unwrap_or(u128::MAX);
        if pool_split > SCALE {
            return Err(ConfigError::FractionOverflow {
                content_type,
                field: "active_pool + passive_pool",
                sum: pool_split,
            });
        }
        Ok(())
    }
}

/// Experience-point parameters of one content type.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XpConfig {
    pub base_xp: u64,
    /// Extra reduction applied to minority XP, scaled.
    #[serde(with = "fixed::decimal")]
    pub minority_factor: u128,
    /// Fraction of base XP a passive staker earns for a full stake share.
    #[serde(with = "fixed::decimal")]
    pub passive_factor: u128,
}

impl XpConfig {
    pub fn check(&self, content_type: ContentType) -> Result<(), ConfigError> {
        for (field, value) in [
            ("minority_factor", self.minority_factor),
            ("passive_factor", self.passive_factor),
        ] {
            if value > SCALE {
                return Err(ConfigError::FractionAboveOne {
                    content_type,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// One row of the content table.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentEntry {
    pub economics: ContentTypeConfig,
    pub xp: XpConfig,
}

impl ContentEntry {
    pub fn defaults_for(content_type: ContentType) -> Self {
        Self {
            economics: content_type.default_economics(),
            xp: content_type.default_xp(),
        }
    }
}

/// Immutable content-type lookup table.
///
/// Share it as `Arc<ContentTable>`; it is never mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentTable {
    entries: [ContentEntry; 6],
}

impl Default for ContentTable {
    fn default() -> Self {
        Self {
            entries: ContentType::ALL.map(ContentEntry::defaults_for),
        }
    }
}

impl ContentTable {
    /// Defaults with the given rows replaced. Every row is checked.
    pub fn with_overrides(
        overrides: &BTreeMap<ContentType, ContentEntry>,
    ) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        for (content_type, entry) in overrides {
            table.entries[content_type.index()] = *entry;
        }
        table.check()?;
        Ok(table)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        for content_type in ContentType::ALL {
            let entry = self.entry(content_type);
            entry.economics.check(content_type)?;
            entry.xp.check(content_type)?;
        }
        Ok(())
    }

    pub fn entry(&self, content_type: ContentType) -> &ContentEntry {
        &self.entries[content_type.index()]
    }

    pub fn economics(&self, content_type: ContentType) -> &ContentTypeConfig {
        &self.entry(content_type).economics
    }

    pub fn xp(&self, content_type: ContentType) -> &XpConfig {
        &self.entry(content_type).xp
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContentType, &ContentEntry)> {
        ContentType::ALL.into_iter().map(|t| (t, self.entry(t)))
    }
}
