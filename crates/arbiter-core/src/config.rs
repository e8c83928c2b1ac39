//! Engine configuration.
//!
//! [`EngineConfig`] carries the decision constants and any content-table
//! overrides. It deserializes from JSON with every field optional; missing
//! fields take the built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::{MIN_VOTERS, THRESHOLD_RATIO};
use crate::content::{ContentEntry, ContentTable, ContentType};
use crate::error::ConfigError;
use crate::types::ClosePolicy;

/// Serializable engine settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Votes required before a decision is considered.
    pub min_voters: u64,
    /// Winning side needs at least this multiple of the losing score.
    pub threshold_ratio: u128,
    /// Policy applied when a window closes undecided and the caller gives none.
    pub default_close_policy: ClosePolicy,
    /// Content-table rows replacing the built-in defaults.
    pub content_overrides: BTreeMap<ContentType, ContentEntry>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_voters: MIN_VOTERS,
            threshold_ratio: THRESHOLD_RATIO,
            default_close_policy: ClosePolicy::default(),
            content_overrides: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the scalar settings and build the content table.
    pub fn build(&self) -> Result<ResolvedConfig, ConfigError> {
        if self.min_voters == 0 {
            return Err(ConfigError::ZeroMinVoters);
        }
        if self.threshold_ratio < 1 {
            return Err(ConfigError::ThresholdRatio(self.threshold_ratio));
        }
        let content = ContentTable::with_overrides(&self.content_overrides)?;
        Ok(ResolvedConfig {
            min_voters: self.min_voters,
            threshold_ratio: self.threshold_ratio,
            default_close_policy: self.default_close_policy,
            content: Arc::new(content),
        })
    }
}

/// Checked configuration ready for the engine. Cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub min_voters: u64,
    pub threshold_ratio: u128,
    pub default_close_policy: ClosePolicy,
    pub content: Arc<ContentTable>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            min_voters: MIN_VOTERS,
            threshold_ratio: THRESHOLD_RATIO,
            default_close_policy: ClosePolicy::default(),
            content: Arc::new(ContentTable::default()),
        }
    }
}
