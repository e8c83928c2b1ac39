//! Trait interfaces for the Arbiter engine.
//!
//! - [`DecisionEvaluator`]: tallies to a [`ModerationResult`]
//! - [`WindowCloser`]: resolves undecided results at the deadline
//! - [`PayoutCalculator`]: stake and XP redistribution for decided items
//!
//! `arbiter-engine` implements all three on `ModerationEngine`. Every method
//! is pure: no I/O, no shared mutable state, bit-identical output for
//! identical input.

use crate::content::ContentType;
use crate::error::EngineError;
use crate::types::{ClosePolicy, ModerationResult, Participant, PayoutResult, TallySnapshot};

/// Turns vote and stake tallies into a decision.
pub trait DecisionEvaluator: Send + Sync {
    /// Evaluate a tally snapshot.
    ///
    /// `now` and `vote_window_end` are Unix seconds; they only set
    /// [`ModerationResult::deadline_passed`]. Expected outcomes such as "not
    /// enough voters" are reported through the result's status and reason;
    /// `Err` means arithmetic overflow.
    fn evaluate(
        &self,
        tally: &TallySnapshot,
        now: u64,
        vote_window_end: u64,
    ) -> Result<ModerationResult, EngineError>;
}

/// Applies a resolution policy once a vote window has closed.
pub trait WindowCloser: Send + Sync {
    /// Resolve an `InProgress` result. Any other status passes through.
    fn close_window(&self, result: &ModerationResult, policy: ClosePolicy) -> ModerationResult;
}

/// Redistributes stake and XP among the participants of a decided item.
pub trait PayoutCalculator: Send + Sync {
    /// Compute payouts, penalties and XP.
    ///
    /// `tally.mint_price_reference` is both the evaluation threshold and the
    /// price the reward pool is cut from. The tally is re-evaluated first;
    /// anything other than `Validated` or `Rejected` yields an empty result,
    /// so speculative calls are harmless.
    fn compute_payouts_and_xp(
        &self,
        content_type: ContentType,
        tally: &TallySnapshot,
        active: &[Participant],
        passive: &[Participant],
    ) -> Result<PayoutResult, EngineError>;
}
