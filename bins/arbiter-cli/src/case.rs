//! JSON case files.
//!
//! A case describes one content item: its raw tally, the clock, and the
//! participants. Scaled amounts are decimal strings (`"9000"`, `"0.21"`),
//! and tally amounts may carry a leading `-` so that malformed store data
//! can be fed to `validate`. A missing `mint_price_reference` falls back to
//! the content type's configured mint price.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use arbiter_core::constants::ONE_TO_ONE_EXCHANGE_RATE;
use arbiter_core::content::{ContentTable, ContentType};
use arbiter_core::fixed;
use arbiter_core::types::{partition_participants, Participant, TallySnapshot};
use arbiter_core::validation::RawTally;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseTally {
    pub votes_yes: i64,
    pub votes_no: i64,
    pub stake_yes: String,
    pub stake_no: String,
    #[serde(default)]
    pub mint_price_reference: Option<String>,
    #[serde(default, with = "optional_decimal")]
    pub exchange_rate: Option<u128>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub content_type: ContentType,
    pub tally: CaseTally,
    #[serde(default)]
    pub now: u64,
    pub vote_window_end: u64,
    /// Mixed list; entries without `vote_choice` are passive stakers.
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Case {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read case file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid case file: {}", path.display()))
    }

    pub fn raw_tally(&self, content: &ContentTable) -> Result<RawTally> {
        let t = &self.tally;
        let mint_price_reference = match &t.mint_price_reference {
            Some(price) => parse_signed(price).context("mint_price_reference")?,
            None => i128::try_from(content.economics(self.content_type).mint_price_reference)
                .context("configured mint price out of range")?,
        };
        Ok(RawTally {
            votes_yes: t.votes_yes,
            votes_no: t.votes_no,
            stake_yes: parse_signed(&t.stake_yes).context("stake_yes")?,
            stake_no: parse_signed(&t.stake_no).context("stake_no")?,
            mint_price_reference,
        })
    }

    /// Validated snapshot, or the validation error.
    pub fn snapshot(&self, content: &ContentTable) -> Result<TallySnapshot> {
        let snapshot = self.raw_tally(content)?.into_snapshot()?;
        Ok(snapshot.with_exchange_rate(self.tally.exchange_rate.unwrap_or(ONE_TO_ONE_EXCHANGE_RATE)))
    }

    /// `(active, passive)` participants.
    pub fn split_participants(&self) -> (Vec<Participant>, Vec<Participant>) {
        partition_participants(self.participants.iter().cloned())
    }
}

/// Decimal string with an optional leading `-`, in scaled units.
pub fn parse_signed(input: &str) -> Result<i128> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let magnitude = fixed::parse_scaled(digits)?;
    let value = i128::try_from(magnitude).context("amount out of range")?;
    Ok(if negative { -value } else { value })
}

mod optional_decimal {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u128>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "arbiter_core::fixed::decimal")] u128);

        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(v)| v))
    }
}
