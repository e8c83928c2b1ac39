//! Input validation for tallies arriving from outside the engine.
//!
//! External stores hand over signed numbers. [`validate`] reports whether a
//! raw tally is usable; [`RawTally::into_snapshot`] performs the same checks
//! and converts to the unsigned [`TallySnapshot`] the evaluator accepts, so a
//! negative count can never reach the arithmetic.

use serde::{Deserialize, Serialize};

use crate::constants::ONE_TO_ONE_EXCHANGE_RATE;
use crate::error::ValidationError;
use crate::types::{StakeTally, TallySnapshot, VoteChoice, VoteTally};

/// Untrusted tally as supplied by a session store.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawTally {
    pub votes_yes: i64,
    pub votes_no: i64,
    /// Scaled stake; negative values are invalid.
    pub stake_yes: i128,
    pub stake_no: i128,
    pub mint_price_reference: i128,
}

/// Boolean-plus-message form of a validation result.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), ValidationError>> for ValidationOutcome {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                error: None,
            },
            Err(e) => Self {
                valid: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Validate a raw tally.
///
/// Rejects negative vote counts, negative stakes, a negative mint price and
/// a tally with no votes at all. Checks run in that order and the first
/// failure is reported.
pub fn validate(raw: &RawTally) -> ValidationOutcome {
    check(raw).into()
}

/// Same checks as [`validate`], returning the typed error.
pub fn check(raw: &RawTally) -> Result<(), ValidationError> {
    for (side, value) in [(VoteChoice::Yes, raw.votes_yes), (VoteChoice::No, raw.votes_no)] {
        if value < 0 {
            return Err(ValidationError::NegativeVotes { side, value });
        }
    }
    for (side, value) in [(VoteChoice::Yes, raw.stake_yes), (VoteChoice::No, raw.stake_no)] {
        if value < 0 {
            return Err(ValidationError::NegativeStake { side, value });
        }
    }
    if raw.mint_price_reference < 0 {
        return Err(ValidationError::NegativeMintPrice(raw.mint_price_reference));
    }
    // Both counts are non-negative here, so the sum cannot wrap below zero.
    if raw.votes_yes == 0 && raw.votes_no == 0 {
        return Err(ValidationError::NoVotes);
    }
    Ok(())
}

impl RawTally {
    /// Validate and convert into an evaluator snapshot with a 1:1 exchange rate.
    pub fn into_snapshot(self) -> Result<TallySnapshot, ValidationError> {
        check(&self)?;
        // Every field was checked non-negative above.
        Ok(TallySnapshot {
            votes: VoteTally::new(self.votes_yes as u64, self.votes_no as u64),
            stakes: StakeTally::new(self.stake_yes as u128, self.stake_no as u128),
            mint_price_reference: self.mint_price_reference as u128,
            exchange_rate: ONE_TO_ONE_EXCHANGE_RATE,
        })
    }
}
