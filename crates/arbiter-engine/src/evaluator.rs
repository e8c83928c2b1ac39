//! Hybrid stake-weighted decision evaluation.
//!
//! Each side's score is the unweighted mean of its head-count share
//! (democratic weight) and its stake share (plutocratic weight). A side wins
//! once its score reaches `threshold_ratio` times the other side's.
//! All arithmetic is integer-only with floor division.

use arbiter_core::constants::{MAX_VICTORY_FACTOR, SCALE};
use arbiter_core::error::{ArithmeticError, EngineError};
use arbiter_core::fixed::{mul_div_floor, ratio};
use arbiter_core::types::{ModerationResult, ModerationStatus, Reason, TallySnapshot, VoteChoice};

/// Scalar decision parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionParams {
    pub min_voters: u64,
    pub threshold_ratio: u128,
}

/// `side_votes / total_votes`, scaled.
pub fn democratic_weight(side_votes: u64, total_votes: u64) -> Result<u128, ArithmeticError> {
    ratio(side_votes as u128, total_votes as u128)
}

/// `side_stake / total_stake`, scaled.
pub fn plutocratic_weight(side_stake: u128, total_stake: u128) -> Result<u128, ArithmeticError> {
    ratio(side_stake, total_stake)
}

/// 50/50 blend of two scaled weights, each at most `SCALE`.
pub fn hybrid_score(democratic: u128, plutocratic: u128) -> u128 {
    // Both inputs are <= SCALE, so the sum stays far below u128::MAX.
    (democratic + plutocratic) / 2
}

/// Margin of victory as a fraction of the winning score, scaled.
///
/// Zero when there is no margin; capped at [`MAX_VICTORY_FACTOR`] so the
/// result stays in `[0, SCALE)`.
pub fn victory_factor(winner_score: u128, loser_score: u128) -> u128 {
    if winner_score == 0 || loser_score >= winner_score {
        return 0;
    }
    // (w - l) < w, so the quotient is below SCALE and cannot overflow.
    match mul_div_floor(winner_score - loser_score, SCALE, winner_score) {
        Ok(vf) => vf.min(MAX_VICTORY_FACTOR),
        Err(_) => MAX_VICTORY_FACTOR,
    }
}

fn reaches_threshold(score: u128, other: u128, threshold_ratio: u128) -> bool {
    match other.checked_mul(threshold_ratio) {
        Some(required) => score >= required,
        None => false,
    }
}

/// Evaluate a tally snapshot.
///
/// The participation guards run before any division: fewer than
/// `min_voters` votes yields `MinVotersNotMet`, and a total stake at or below
/// the mint price (converted to stake units) yields `PoolBelowMint`. Both
/// guards therefore cover zero votes and zero stake.
pub fn decide(
    params: &DecisionParams,
    tally: &TallySnapshot,
    deadline_passed: bool,
) -> Result<ModerationResult, EngineError> {
    let total_votes = tally.votes.total().ok_or(ArithmeticError::Overflow)?;
    let total_stake = tally.stakes.total()?;

    if total_votes < params.min_voters {
        return Ok(ModerationResult::pending(
            Reason::MinVotersNotMet,
            total_votes,
            total_stake,
            deadline_passed,
        ));
    }

    let mint_in_stake_units = tally.to_stake_units(tally.mint_price_reference)?;
    if total_stake <= mint_in_stake_units {
        return Ok(ModerationResult::pending(
            Reason::PoolBelowMint,
            total_votes,
            total_stake,
            deadline_passed,
        ));
    }

    let score_yes = hybrid_score(
        democratic_weight(tally.votes.yes, total_votes)?,
        plutocratic_weight(tally.stakes.yes, total_stake)?,
    );
    let score_no = hybrid_score(
        democratic_weight(tally.votes.no, total_votes)?,
        plutocratic_weight(tally.stakes.no, total_stake)?,
    );

    let (status, winner, reason) = if reaches_threshold(score_yes, score_no, params.threshold_ratio) {
        (ModerationStatus::Validated, Some(VoteChoice::Yes), Reason::Validated)
    } else if reaches_threshold(score_no, score_yes, params.threshold_ratio) {
        (ModerationStatus::Rejected, Some(VoteChoice::No), Reason::Rejected)
    } else {
        (ModerationStatus::InProgress, None, Reason::ThresholdNotReached)
    };

    let victory_factor = match winner {
        Some(VoteChoice::Yes) => victory_factor(score_yes, score_no),
        Some(VoteChoice::No) => victory_factor(score_no, score_yes),
        None => 0,
    };

    Ok(ModerationResult {
        status,
        winner,
        score_yes,
        score_no,
        victory_factor,
        reason,
        total_votes,
        total_stake,
        deadline_passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::constants::{MIN_VOTERS, THRESHOLD_RATIO};
    use arbiter_core::types::{StakeTally, VoteTally};
    use proptest::prelude::*;

    fn params() -> DecisionParams {
        DecisionParams {
            min_voters: MIN_VOTERS,
            threshold_ratio: THRESHOLD_RATIO,
        }
    }

    fn snapshot(vy: u64, vn: u64, sy: u128, sn: u128, mint: u128) -> TallySnapshot {
        TallySnapshot::new(VoteTally::new(vy, vn), StakeTally::new(sy, sn), mint)
    }

    // --- weights ---

    #[test]
    fn democratic_weight_floors() {
        assert_eq!(democratic_weight(1, 3).unwrap(), 333_333_333_333_333_333);
        assert_eq!(democratic_weight(0, 3).unwrap(), 0);
        assert_eq!(democratic_weight(3, 3).unwrap(), SCALE);
    }

    #[test]
    fn weights_reject_zero_totals() {
        assert_eq!(democratic_weight(0, 0), Err(ArithmeticError::DivisionByZero));
        assert_eq!(plutocratic_weight(0, 0), Err(ArithmeticError::DivisionByZero));
    }

    #[test]
    fn hybrid_is_mean() {
        assert_eq!(hybrid_score(SCALE, 0), SCALE / 2);
        assert_eq!(hybrid_score(SCALE / 2, SCALE / 2), SCALE / 2);
        assert_eq!(hybrid_score(SCALE, SCALE), SCALE);
    }

    // --- victory factor ---

    #[test]
    fn victory_factor_zero_on_tie_or_loss() {
        assert_eq!(victory_factor(SCALE / 2, SCALE / 2), 0);
        assert_eq!(victory_factor(SCALE / 4, SCALE / 2), 0);
        assert_eq!(victory_factor(0, 0), 0);
    }

    #[test]
    fn victory_factor_half_margin() {
        // (0.6 - 0.3) / 0.6 = 0.5
        assert_eq!(victory_factor(6 * SCALE / 10, 3 * SCALE / 10), SCALE / 2);
    }

    #[test]
    fn victory_factor_capped_below_scale() {
        assert_eq!(victory_factor(SCALE, 0), MAX_VICTORY_FACTOR);
    }

    // --- guards ---

    #[test]
    fn below_min_voters_is_pending() {
        let r = decide(&params(), &snapshot(21, 0, 9000 * SCALE, 0, 0), false).unwrap();
        assert_eq!(r.status, ModerationStatus::PendingRequirements);
        assert_eq!(r.reason, Reason::MinVotersNotMet);
        assert_eq!(r.total_votes, 21);
        assert_eq!(r.winner, None);
    }

    #[test]
    fn zero_votes_and_zero_stake_do_not_divide() {
        let r = decide(&params(), &snapshot(0, 0, 0, 0, 0), false).unwrap();
        assert_eq!(r.reason, Reason::MinVotersNotMet);
    }

    #[test]
    fn zero_stake_with_voters_is_pool_below_mint() {
        let r = decide(&params(), &snapshot(30, 0, 0, 0, 0), false).unwrap();
        assert_eq!(r.status, ModerationStatus::PendingRequirements);
        assert_eq!(r.reason, Reason::PoolBelowMint);
    }

    #[test]
    fn stake_equal_to_mint_is_pool_below_mint() {
        let r = decide(&params(), &snapshot(20, 5, 600 * SCALE, 400 * SCALE, 1000 * SCALE), false)
            .unwrap();
        assert_eq!(r.reason, Reason::PoolBelowMint);
        assert_eq!(r.total_stake, 1000 * SCALE);
    }

    #[test]
    fn exchange_rate_converts_mint_price() {
        // Mint 1000 at 2 stake units per price unit → 2000 stake units needed.
        let snap = snapshot(20, 5, 1500 * SCALE, 0, 1000 * SCALE).with_exchange_rate(2 * SCALE);
        let r = decide(&params(), &snap, false).unwrap();
        assert_eq!(r.reason, Reason::PoolBelowMint);

        let snap = snapshot(20, 5, 2500 * SCALE, 0, 1000 * SCALE).with_exchange_rate(2 * SCALE);
        let r = decide(&params(), &snap, false).unwrap();
        assert_ne!(r.reason, Reason::PoolBelowMint);
    }

    #[test]
    fn custom_min_voters_respected() {
        let p = DecisionParams { min_voters: 3, ..params() };
        let r = decide(&p, &snapshot(3, 0, 10 * SCALE, 0, 0), false).unwrap();
        assert_eq!(r.status, ModerationStatus::Validated);
    }

    // --- decisions ---

    #[test]
    fn strong_majority_validates() {
        let r = decide(
            &params(),
            &snapshot(20, 5, 9000 * SCALE, 1000 * SCALE, 1000 * SCALE),
            false,
        )
        .unwrap();
        assert_eq!(r.status, ModerationStatus::Validated);
        assert_eq!(r.winner, Some(VoteChoice::Yes));
        assert_eq!(r.reason, Reason::Validated);
        // dem 0.8 / pluto 0.9 → 0.85 ; dem 0.2 / pluto 0.1 → 0.15
        assert_eq!(r.score_yes, 85 * SCALE / 100);
        assert_eq!(r.score_no, 15 * SCALE / 100);
        assert!(r.victory_factor > SCALE / 2);
    }

    #[test]
    fn strong_minority_rejects() {
        let r = decide(&params(), &snapshot(4, 20, 100 * SCALE, 5000 * SCALE, 0), false).unwrap();
        assert_eq!(r.status, ModerationStatus::Rejected);
        assert_eq!(r.winner, Some(VoteChoice::No));
        assert_eq!(r.reason, Reason::Rejected);
    }

    #[test]
    fn whale_cannot_override_many_voters() {
        let r = decide(
            &params(),
            &snapshot(1, 21, 4_800_000_000 * SCALE, 21 * SCALE / 100, 1000 * SCALE),
            false,
        )
        .unwrap();
        assert_eq!(r.status, ModerationStatus::InProgress);
        assert_eq!(r.reason, Reason::ThresholdNotReached);
        assert_eq!(r.victory_factor, 0);
    }

    #[test]
    fn tie_stays_in_progress() {
        let r = decide(&params(), &snapshot(15, 15, 5000 * SCALE, 5000 * SCALE, 0), false).unwrap();
        assert_eq!(r.status, ModerationStatus::InProgress);
        assert_eq!(r.score_yes, r.score_no);
        assert_eq!(r.victory_factor, 0);
    }

    #[test]
    fn exactly_double_score_validates() {
        // dem yes = 2/3, pluto yes = 2/3 → yes 2/3, no 1/3 (floors keep yes >= 2*no).
        let r = decide(&params(), &snapshot(20, 10, 200 * SCALE, 100 * SCALE, 0), false).unwrap();
        assert!(r.score_yes >= 2 * r.score_no);
        assert_eq!(r.status, ModerationStatus::Validated);
    }

    #[test]
    fn deadline_flag_is_carried() {
        let r = decide(&params(), &snapshot(15, 15, SCALE, SCALE, 0), true).unwrap();
        assert!(r.deadline_passed);
        let r = decide(&params(), &snapshot(1, 1, SCALE, SCALE, 0), true).unwrap();
        assert!(r.deadline_passed);
    }

    #[test]
    fn stake_overflow_is_error() {
        let r = decide(&params(), &snapshot(20, 5, u128::MAX, 1, 0), false);
        assert!(matches!(r, Err(EngineError::Arithmetic(ArithmeticError::Overflow))));
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn under_min_voters_always_pending(
            vy in 0u64..11, vn in 0u64..11,
            sy in 0u128..u64::MAX as u128, sn in 0u128..u64::MAX as u128,
        ) {
            let r = decide(&params(), &snapshot(vy, vn, sy, sn, 0), false).unwrap();
            prop_assert_eq!(r.status, ModerationStatus::PendingRequirements);
            prop_assert_eq!(r.reason, Reason::MinVotersNotMet);
        }

        #[test]
        fn threshold_equivalence(
            vy in 0u64..500, vn in 0u64..500,
            sy in 1u128..1_000_000 * SCALE, sn in 1u128..1_000_000 * SCALE,
        ) {
            prop_assume!(vy + vn >= MIN_VOTERS);
            let r = decide(&params(), &snapshot(vy, vn, sy, sn, 0), false).unwrap();
            let yes_wins = r.score_yes >= 2 * r.score_no;
            let no_wins = r.score_no >= 2 * r.score_yes;
            match r.status {
                ModerationStatus::Validated => prop_assert!(yes_wins),
                ModerationStatus::Rejected => prop_assert!(no_wins && !yes_wins),
                ModerationStatus::InProgress => prop_assert!(!yes_wins && !no_wins),
                other => prop_assert!(false, "unexpected status {:?}", other),
            }
            prop_assert!(r.victory_factor < SCALE);
            prop_assert!(r.score_yes <= SCALE && r.score_no <= SCALE);
        }

        #[test]
        fn more_yes_stake_never_lowers_yes_score(
            vy in 0u64..100, vn in 0u64..100,
            sy in 0u128..1_000_000 * SCALE, sn in 1u128..1_000_000 * SCALE,
            extra in 0u128..1_000_000 * SCALE,
        ) {
            prop_assume!(vy + vn >= MIN_VOTERS);
            let a = decide(&params(), &snapshot(vy, vn, sy, sn, 0), false).unwrap();
            let b = decide(&params(), &snapshot(vy, vn, sy + extra, sn, 0), false).unwrap();
            prop_assert!(b.score_yes >= a.score_yes);
        }

        #[test]
        fn decide_deterministic(
            vy in 0u64..1000, vn in 0u64..1000,
            sy in 0u128..u64::MAX as u128, sn in 0u128..u64::MAX as u128,
        ) {
            let s = snapshot(vy, vn, sy, sn, 0);
            prop_assert_eq!(decide(&params(), &s, false).unwrap(), decide(&params(), &s, false).unwrap());
        }
    }
}
