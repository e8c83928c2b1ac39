//! Core domain types: tallies, decisions, participants and payouts.
//!
//! All scaled fields (stakes, scores, amounts, fractions) are `u128` with the
//! implicit denominator [`SCALE`](crate::constants::SCALE). In JSON they are
//! written as decimal strings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{ONE_TO_ONE_EXCHANGE_RATE, SECONDS_PER_HOUR};
use crate::error::{ArithmeticError, EngineError};
use crate::fixed;

/// Which side of the question a vote (or a winning outcome) is on.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    pub fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

/// Aggregated head-count votes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub yes: u64,
    pub no: u64,
}

impl VoteTally {
    pub fn new(yes: u64, no: u64) -> Self {
        Self { yes, no }
    }

    /// Total votes cast. Returns `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.yes.checked_add(self.no)
    }

    pub fn side(&self, choice: VoteChoice) -> u64 {
        match choice {
            VoteChoice::Yes => self.yes,
            VoteChoice::No => self.no,
        }
    }
}

/// Aggregated stake per side, in scaled units.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StakeTally {
    #[serde(with = "fixed::decimal")]
    pub yes: u128,
    #[serde(with = "fixed::decimal")]
    pub no: u128,
}

impl StakeTally {
    pub fn new(yes: u128, no: u128) -> Self {
        Self { yes, no }
    }

    pub fn total(&self) -> Result<u128, ArithmeticError> {
        fixed::checked_add(self.yes, self.no)
    }

    pub fn side(&self, choice: VoteChoice) -> u128 {
        match choice {
            VoteChoice::Yes => self.yes,
            VoteChoice::No => self.no,
        }
    }
}

/// Snapshot of everything the evaluator needs about one content item.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TallySnapshot {
    pub votes: VoteTally,
    pub stakes: StakeTally,
    /// Mint price of the content, in the price-reference unit.
    #[serde(with = "fixed::decimal")]
    pub mint_price_reference: u128,
    /// Stake units per price-reference unit, scaled. `SCALE` means 1:1.
    #[serde(with = "fixed::decimal", default = "default_exchange_rate")]
    pub exchange_rate: u128,
}

fn default_exchange_rate() -> u128 {
    ONE_TO_ONE_EXCHANGE_RATE
}

impl TallySnapshot {
    /// Snapshot with a 1:1 exchange rate.
    pub fn new(votes: VoteTally, stakes: StakeTally, mint_price_reference: u128) -> Self {
        Self {
            votes,
            stakes,
            mint_price_reference,
            exchange_rate: ONE_TO_ONE_EXCHANGE_RATE,
        }
    }

    pub fn with_exchange_rate(mut self, exchange_rate: u128) -> Self {
        self.exchange_rate = exchange_rate;
        self
    }

    /// Convert a price-reference amount into stake units.
    pub fn to_stake_units(&self, price_amount: u128) -> Result<u128, ArithmeticError> {
        fixed::apply_fraction(price_amount, self.exchange_rate)
    }
}

/// Lifecycle state of a moderation decision.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    /// Not enough voters or stake to decide anything yet.
    PendingRequirements,
    /// Enough participation, but neither side reached the threshold.
    InProgress,
    Validated,
    Rejected,
    /// The vote window closed undecided and a human must resolve it.
    RequiresEscalation,
}

impl ModerationStatus {
    /// Whether payouts may be computed for this status.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Validated | Self::Rejected)
    }
}

/// Machine-readable explanation attached to every [`ModerationResult`].
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "code")]
pub enum Reason {
    MinVotersNotMet,
    PoolBelowMint,
    ThresholdNotReached,
    Validated,
    Rejected,
    Escalated,
    AutoAccepted,
    AutoRejected,
    WindowExtended { hours: u32 },
}

impl Reason {
    /// Stable code callers branch on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MinVotersNotMet => "MIN_VOTERS_NOT_MET",
            Self::PoolBelowMint => "POOL_BELOW_MINT",
            Self::ThresholdNotReached => "THRESHOLD_NOT_REACHED",
            Self::Validated => "VALIDATED",
            Self::Rejected => "REJECTED",
            Self::Escalated => "ESCALATED",
            Self::AutoAccepted => "AUTO_ACCEPTED",
            Self::AutoRejected => "AUTO_REJECTED",
            Self::WindowExtended { .. } => "WINDOW_EXTENDED",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What to do with an undecided item once its vote window has passed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClosePolicy {
    #[default]
    Escalate,
    AutoAccept,
    AutoReject,
    /// Keep the item open; the caller re-opens the window for this many hours.
    ExtendByHours(u32),
}

/// Outcome of one evaluation. Built once, never mutated.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct ModerationResult {
    pub status: ModerationStatus,
    pub winner: Option<VoteChoice>,
    #[serde(with = "fixed::decimal")]
    pub score_yes: u128,
    #[serde(with = "fixed::decimal")]
    pub score_no: u128,
    /// `(winner - loser) / winner`, scaled, in `[0, SCALE)`.
    #[serde(with = "fixed::decimal")]
    pub victory_factor: u128,
    pub reason: Reason,
    pub total_votes: u64,
    #[serde(with = "fixed::decimal")]
    pub total_stake: u128,
    /// `now >= vote_window_end` at evaluation time.
    pub deadline_passed: bool,
}

impl ModerationResult {
    /// A result that stops before any scoring happened.
    pub fn pending(reason: Reason, total_votes: u64, total_stake: u128, deadline_passed: bool) -> Self {
        Self {
            status: ModerationStatus::PendingRequirements,
            winner: None,
            score_yes: 0,
            score_no: 0,
            victory_factor: 0,
            reason,
            total_votes,
            total_stake,
            deadline_passed,
        }
    }

    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }

    pub fn score(&self, side: VoteChoice) -> u128 {
        match side {
            VoteChoice::Yes => self.score_yes,
            VoteChoice::No => self.score_no,
        }
    }

    /// New deadline requested by a [`ClosePolicy::ExtendByHours`] closure.
    ///
    /// Returns `None` unless this result carries [`Reason::WindowExtended`].
    pub fn extended_deadline(&self, vote_window_end: u64) -> Option<u64> {
        match self.reason {
            Reason::WindowExtended { hours } => Some(
                vote_window_end.saturating_add((hours as u64).saturating_mul(SECONDS_PER_HOUR)),
            ),
            _ => None,
        }
    }
}

/// A staker attached to a content item.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub address: String,
    #[serde(with = "fixed::decimal")]
    pub stake: u128,
    /// `None` for passive stakers who did not vote.
    #[serde(default)]
    pub vote_choice: Option<VoteChoice>,
}

impl Participant {
    pub fn active(address: impl Into<String>, stake: u128, choice: VoteChoice) -> Self {
        Self {
            address: address.into(),
            stake,
            vote_choice: Some(choice),
        }
    }

    pub fn passive(address: impl Into<String>, stake: u128) -> Self {
        Self {
            address: address.into(),
            stake,
            vote_choice: None,
        }
    }
}

/// Split a mixed participant list into `(active, passive)` by whether a vote
/// was cast. Order within each set is preserved.
pub fn partition_participants(
    participants: impl IntoIterator<Item = Participant>,
) -> (Vec<Participant>, Vec<Participant>) {
    participants
        .into_iter()
        .partition(|p| p.vote_choice.is_some())
}

/// Why a participant is receiving tokens.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum PayoutRole {
    Majority,
    Passive,
}

#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct PayoutEntry {
    pub address: String,
    pub role: PayoutRole,
    #[serde(with = "fixed::decimal")]
    pub amount: u128,
    pub xp_delta: u64,
}

/// A minority voter's stake loss. `xp_delta` is still a (reduced) gain.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct PenaltyEntry {
    pub address: String,
    #[serde(with = "fixed::decimal")]
    pub amount: u128,
    pub xp_delta: u64,
}

/// Pool accounting for one payout computation.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, bincode::Encode,
    bincode::Decode,
)]
pub struct PayoutSummary {
    #[serde(with = "fixed::decimal")]
    pub total_paid: u128,
    #[serde(with = "fixed::decimal")]
    pub total_penalties: u128,
    #[serde(with = "fixed::decimal")]
    pub active_pool: u128,
    #[serde(with = "fixed::decimal")]
    pub passive_pool: u128,
    #[serde(with = "fixed::decimal")]
    pub penalty_pool_from_minority: u128,
    #[serde(with = "fixed::decimal")]
    pub victory_factor: u128,
    /// The passive pool went to the majority because nobody was passive.
    pub passive_redistributed: bool,
    /// Pool value not attributed to anyone (rounding dust, or no recipients).
    #[serde(with = "fixed::decimal")]
    pub unallocated: u128,
    pub total_xp: u64,
}

/// A 32-byte BLAKE3 digest identifying one payout result.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode,
)]
pub struct SettlementKey(pub [u8; 32]);

impl SettlementKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SettlementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Redistribution of stake and XP for one decided item.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub struct PayoutResult {
    /// Status the payout was computed under (re-evaluated internally).
    pub status: ModerationStatus,
    pub winner: Option<VoteChoice>,
    pub payouts: Vec<PayoutEntry>,
    pub penalties: Vec<PenaltyEntry>,
    pub summary: PayoutSummary,
}

impl PayoutResult {
    /// No redistribution: the item is not decided.
    pub fn empty(status: ModerationStatus) -> Self {
        Self {
            status,
            winner: None,
            payouts: Vec::new(),
            penalties: Vec::new(),
            summary: PayoutSummary::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty() && self.penalties.is_empty()
    }

    /// BLAKE3 hash of the canonical bincode encoding.
    ///
    /// Identical inputs always yield the same key, so a ledger can use it to
    /// apply a settlement exactly once.
    pub fn settlement_key(&self) -> Result<SettlementKey, EngineError> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| EngineError::Encoding(e.to_string()))?;
        Ok(SettlementKey(blake3::hash(&encoded).into()))
    }
}
