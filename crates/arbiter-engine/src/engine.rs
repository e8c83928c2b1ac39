//! Moderation engine implementing the [`DecisionEvaluator`],
//! [`WindowCloser`] and [`PayoutCalculator`] traits.
//!
//! The engine owns a checked [`ResolvedConfig`]; the content table inside it
//! is shared behind an `Arc`, so cloning the engine is cheap and clones can
//! be used from any number of threads.

use tracing::{debug, trace, warn};

use arbiter_core::config::{EngineConfig, ResolvedConfig};
use arbiter_core::content::ContentType;
use arbiter_core::error::{ConfigError, EngineError};
use arbiter_core::traits::{DecisionEvaluator, PayoutCalculator, WindowCloser};
use arbiter_core::types::{
    ClosePolicy, ModerationResult, Participant, PayoutResult, TallySnapshot,
};

use crate::closure::close_window;
use crate::evaluator::{decide, DecisionParams};
use crate::payout::settle;

/// The production moderation engine.
#[derive(Debug, Clone, Default)]
pub struct ModerationEngine {
    config: ResolvedConfig,
}

impl ModerationEngine {
    /// Create an engine from an already checked configuration.
    pub fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }

    /// Check `config` and create an engine from it.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.build()?))
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    fn params(&self) -> DecisionParams {
        DecisionParams {
            min_voters: self.config.min_voters,
            threshold_ratio: self.config.threshold_ratio,
        }
    }

    /// Evaluate, then close the window if the deadline has passed.
    ///
    /// `policy` defaults to the configured close policy.
    pub fn evaluate_and_close(
        &self,
        tally: &TallySnapshot,
        now: u64,
        vote_window_end: u64,
        policy: Option<ClosePolicy>,
    ) -> Result<ModerationResult, EngineError> {
        let result = self.evaluate(tally, now, vote_window_end)?;
        if !result.deadline_passed {
            return Ok(result);
        }
        let policy = policy.unwrap_or(self.config.default_close_policy);
        Ok(self.close_window(&result, policy))
    }

    /// Compute payouts for an already final decision.
    ///
    /// Unlike [`PayoutCalculator::compute_payouts_and_xp`] this does not
    /// re-evaluate the tally, so it honours outcomes forced by
    /// [`close_window`](WindowCloser::close_window).
    pub fn settle_decision(
        &self,
        content_type: ContentType,
        decision: &ModerationResult,
        tally: &TallySnapshot,
        active: &[Participant],
        passive: &[Participant],
    ) -> Result<PayoutResult, EngineError> {
        let entry = self.config.content.entry(content_type);
        let result = settle(&entry.economics, &entry.xp, decision, tally, active, passive)?;

        if result.is_empty() {
            debug!(
                content_type = %content_type,
                status = ?decision.status,
                "no redistribution for undecided content"
            );
            return Ok(result);
        }

        for p in &result.payouts {
            trace!(address = %p.address, role = ?p.role, amount = p.amount, xp = p.xp_delta, "payout");
        }
        for p in &result.penalties {
            trace!(address = %p.address, amount = p.amount, xp = p.xp_delta, "penalty");
        }

        let s = &result.summary;
        debug!(
            content_type = %content_type,
            winner = ?result.winner,
            payouts = result.payouts.len(),
            penalties = result.penalties.len(),
            total_paid = s.total_paid,
            total_penalties = s.total_penalties,
            active_pool = s.active_pool,
            passive_pool = s.passive_pool,
            unallocated = s.unallocated,
            "settled"
        );
        if s.unallocated > result.payouts.len() as u128 * 2 {
            warn!(
                content_type = %content_type,
                unallocated = s.unallocated,
                "reward pool left unallocated: no majority recipient"
            );
        }
        Ok(result)
    }
}

impl DecisionEvaluator for ModerationEngine {
    fn evaluate(
        &self,
        tally: &TallySnapshot,
        now: u64,
        vote_window_end: u64,
    ) -> Result<ModerationResult, EngineError> {
        let result = decide(&self.params(), tally, now >= vote_window_end)?;
        debug!(
            votes_yes = tally.votes.yes,
            votes_no = tally.votes.no,
            stake_yes = tally.stakes.yes,
            stake_no = tally.stakes.no,
            score_yes = result.score_yes,
            score_no = result.score_no,
            victory_factor = result.victory_factor,
            status = ?result.status,
            reason = %result.reason,
            "evaluated"
        );
        Ok(result)
    }
}

impl WindowCloser for ModerationEngine {
    fn close_window(&self, result: &ModerationResult, policy: ClosePolicy) -> ModerationResult {
        let closed = close_window(result, policy);
        if closed != *result {
            debug!(?policy, from = ?result.status, to = ?closed.status, reason = %closed.reason, "vote window closed");
        }
        closed
    }
}

impl PayoutCalculator for ModerationEngine {
    fn compute_payouts_and_xp(
        &self,
        content_type: ContentType,
        tally: &TallySnapshot,
        active: &[Participant],
        passive: &[Participant],
    ) -> Result<PayoutResult, EngineError> {
        let decision = decide(&self.params(), tally, false)?;
        self.settle_decision(content_type, &decision, tally, active, passive)
    }
}
