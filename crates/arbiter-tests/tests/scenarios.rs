//! End-to-end decision scenarios.
//!
//! Each test drives the engine the way a moderation-session orchestrator
//! would: evaluate on every tally change, close the window at the deadline,
//! and compute payouts once a final status is reached.

use arbiter_core::constants::SCALE;
use arbiter_core::content::ContentType;
use arbiter_core::traits::{DecisionEvaluator, PayoutCalculator, WindowCloser};
use arbiter_core::types::*;
use arbiter_core::validation::{validate, RawTally};
use arbiter_engine::ModerationEngine;
use arbiter_tests::helpers::*;

fn engine() -> ModerationEngine {
    ModerationEngine::default()
}

// ---------------------------------------------------------------------------
// Scenario A: strong majority
// ---------------------------------------------------------------------------

#[test]
fn strong_majority_is_validated() {
    let tally = snapshot(20, 5, tokens(9000), tokens(1000), tokens(1000));
    let r = engine().evaluate(&tally, 0, 100).unwrap();

    assert_eq!(r.status, ModerationStatus::Validated);
    assert_eq!(r.winner, Some(VoteChoice::Yes));
    assert_eq!(r.reason.code(), "VALIDATED");
    assert!(r.victory_factor > SCALE / 2, "vf = {}", r.victory_factor);
    assert_eq!(r.total_votes, 25);
    assert_eq!(r.total_stake, tokens(10_000));
}

#[test]
fn strong_majority_payouts() {
    let e = engine();
    let tally = snapshot(20, 5, tokens(9000), tokens(1000), tokens(1000));
    let active = participants_for(&tally);
    let r = e
        .compute_payouts_and_xp(ContentType::OrgInitialStoryStandard, &tally, &active, &[])
        .unwrap();

    assert_eq!(r.status, ModerationStatus::Validated);
    assert_eq!(r.payouts.len(), 20);
    assert_eq!(r.penalties.len(), 5);

    let decision = e.evaluate(&tally, 0, 100).unwrap();
    let expected_penalty_each = tokens(200) * decision.victory_factor / SCALE;
    for p in &r.penalties {
        assert_eq!(p.amount, expected_penalty_each);
        assert!(p.amount < tokens(200));
    }

    // price 1000 → reward 300 → active 240, passive 60 (folded in).
    let s = r.summary;
    assert_eq!(s.active_pool, tokens(240));
    assert_eq!(s.passive_pool, tokens(60));
    assert!(s.passive_redistributed);
    assert_eq!(
        s.total_paid + s.unallocated,
        s.active_pool + s.passive_pool + s.penalty_pool_from_minority
    );
    assert!(s.unallocated < 100);

    let majority_xp = r.payouts[1].xp_delta;
    let minority_xp = r.penalties[0].xp_delta;
    assert!(majority_xp > minority_xp);
}

// ---------------------------------------------------------------------------
// Scenario B: whale vs. micro-stakers
// ---------------------------------------------------------------------------

#[test]
fn whale_cannot_override_independent_voters() {
    let tally = snapshot(1, 21, tokens(4_800_000_000), 21 * SCALE / 100, tokens(1000));
    let r = engine().evaluate(&tally, 0, 100).unwrap();

    assert_eq!(r.status, ModerationStatus::InProgress);
    assert_eq!(r.reason, Reason::ThresholdNotReached);
    assert_eq!(r.winner, None);
    assert!(r.score_yes > r.score_no);
    assert!(r.score_yes < 2 * r.score_no);
}

#[test]
fn swarm_without_stake_cannot_override_either() {
    // 21 zero-stake identities against one staked voter.
    let tally = snapshot(1, 21, tokens(5000), 0, tokens(1000));
    let r = engine().evaluate(&tally, 0, 100).unwrap();
    assert_eq!(r.status, ModerationStatus::InProgress);
}

// ---------------------------------------------------------------------------
// Scenario C: tie
// ---------------------------------------------------------------------------

#[test]
fn tie_is_in_progress_with_zero_margin() {
    let tally = snapshot(15, 15, tokens(5000), tokens(5000), tokens(1000));
    let r = engine().evaluate(&tally, 0, 100).unwrap();
    assert_eq!(r.status, ModerationStatus::InProgress);
    assert_eq!(r.victory_factor, 0);
    assert_eq!(r.score_yes, r.score_no);
}

#[test]
fn tie_escalates_at_deadline() {
    let e = engine();
    let tally = snapshot(15, 15, tokens(5000), tokens(5000), tokens(1000));
    let r = e.evaluate_and_close(&tally, 100, 100, None).unwrap();
    assert_eq!(r.status, ModerationStatus::RequiresEscalation);
    assert_eq!(r.reason.code(), "ESCALATED");

    let payouts = e
        .compute_payouts_and_xp(ContentType::OrgCompletionPaid, &tally, &participants_for(&tally), &[])
        .unwrap();
    assert!(payouts.is_empty());
}

// ---------------------------------------------------------------------------
// Scenario D: free completion content
// ---------------------------------------------------------------------------

#[test]
fn free_completion_pays_xp_but_no_tokens() {
    let tally = snapshot(20, 5, tokens(9000), tokens(1000), 0);
    let active = participants_for(&tally);
    let passive = vec![Participant::passive("lurker", tokens(50))];
    let r = engine()
        .compute_payouts_and_xp(ContentType::OrgCompletionFree, &tally, &active, &passive)
        .unwrap();

    assert_eq!(r.status, ModerationStatus::Validated);
    assert!(!r.payouts.is_empty());
    for p in &r.payouts {
        assert_eq!(p.amount, 0, "{} received tokens", p.address);
    }
    for p in r.payouts.iter().filter(|p| p.role == PayoutRole::Majority) {
        assert!(p.xp_delta > 0, "{} got no XP", p.address);
    }
    for p in &r.penalties {
        assert_eq!(p.amount, 0);
    }
    assert_eq!(r.summary.total_paid, 0);
    assert!(r.summary.total_xp > 0);
}

#[test]
fn individual_creator_types_are_unmonetized() {
    let tally = snapshot(20, 5, tokens(9000), tokens(1000), tokens(10));
    let active = participants_for(&tally);
    for t in [ContentType::IndividualInitialStory, ContentType::IndividualCompletion] {
        let r = engine().compute_payouts_and_xp(t, &tally, &active, &[]).unwrap();
        assert_eq!(r.summary.total_paid, 0, "{t}");
        assert_eq!(r.summary.total_penalties, 0, "{t}");
        assert!(r.summary.total_xp > 0, "{t}");
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

#[test]
fn session_lifecycle() {
    let e = engine();
    let end = 1_000;

    // Early votes: not enough participation.
    let early = snapshot(5, 1, tokens(500), tokens(10), tokens(100));
    assert_eq!(e.evaluate(&early, 10, end).unwrap().reason, Reason::MinVotersNotMet);

    // Enough voters, but the pool is still below the mint price.
    let thin = snapshot(20, 2, tokens(50), tokens(10), tokens(100));
    assert_eq!(e.evaluate(&thin, 20, end).unwrap().reason, Reason::PoolBelowMint);

    // Contested.
    let contested = snapshot(14, 10, tokens(600), tokens(400), tokens(100));
    let r = e.evaluate(&contested, 30, end).unwrap();
    assert_eq!(r.status, ModerationStatus::InProgress);

    // Deadline passes: extend once.
    let extended = e.close_window(&e.evaluate(&contested, end, end).unwrap(), ClosePolicy::ExtendByHours(12));
    let new_end = extended.extended_deadline(end).unwrap();
    assert_eq!(new_end, end + 12 * 3_600);

    // More votes arrive during the extension and settle it.
    let settled = snapshot(40, 10, tokens(3000), tokens(400), tokens(100));
    let r = e.evaluate(&settled, end + 60, new_end).unwrap();
    assert_eq!(r.status, ModerationStatus::Validated);
    assert!(!r.deadline_passed);

    let payout = e
        .compute_payouts_and_xp(ContentType::OrgCompletionPaid, &settled, &participants_for(&settled), &[])
        .unwrap();
    assert_eq!(payout.payouts.len(), 40);
    assert_eq!(payout.penalties.len(), 10);
    assert_eq!(payout.summary.victory_factor, r.victory_factor);
}

#[test]
fn auto_accept_then_settle_decision() {
    let e = engine();
    let tally = snapshot(14, 10, tokens(600), tokens(400), tokens(100));
    let closed = e.close_window(&e.evaluate(&tally, 10, 10).unwrap(), ClosePolicy::AutoAccept);
    assert_eq!(closed.status, ModerationStatus::Validated);
    assert!(closed.victory_factor > 0);

    let active = participants_for(&tally);
    // Re-evaluating ignores the forced outcome...
    assert!(e
        .compute_payouts_and_xp(ContentType::OrgCompletionPaid, &tally, &active, &[])
        .unwrap()
        .is_empty());
    // ...settling the closed decision honours it.
    let r = e
        .settle_decision(ContentType::OrgCompletionPaid, &closed, &tally, &active, &[])
        .unwrap();
    assert_eq!(r.payouts.len(), 14);
    assert_eq!(r.penalties.len(), 10);
    assert!(r.summary.total_penalties > 0);
}

#[test]
fn validator_gates_raw_input() {
    let raw = RawTally {
        votes_yes: 20,
        votes_no: -5,
        stake_yes: tokens(9000) as i128,
        stake_no: tokens(1000) as i128,
        mint_price_reference: tokens(1000) as i128,
    };
    assert!(!validate(&raw).valid);
    assert!(raw.into_snapshot().is_err());

    let fixed = RawTally { votes_no: 5, ..raw };
    let tally = fixed.into_snapshot().unwrap();
    assert_eq!(engine().evaluate(&tally, 0, 1).unwrap().status, ModerationStatus::Validated);
}

#[test]
fn settlement_key_identical_across_calls() {
    let e = engine();
    let tally = snapshot(20, 5, tokens(9000), tokens(1000), tokens(1000));
    let active = participants_for(&tally);
    let a = e.compute_payouts_and_xp(ContentType::OrgCompletionPaid, &tally, &active, &[]).unwrap();
    let b = e.compute_payouts_and_xp(ContentType::OrgCompletionPaid, &tally, &active, &[]).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.settlement_key().unwrap(), b.settlement_key().unwrap());
}
