//! Vote-window closure.
//!
//! Once the deadline passes, an `InProgress` result is resolved by a
//! [`ClosePolicy`]. Results in any other state are returned unchanged.

use arbiter_core::types::{ClosePolicy, ModerationResult, ModerationStatus, Reason, VoteChoice};

use crate::evaluator::victory_factor;

/// Apply `policy` to an undecided result.
///
/// Forced outcomes keep the measured scores; the victory factor is recomputed
/// for the forced winner and is zero when that side was not ahead.
pub fn close_window(result: &ModerationResult, policy: ClosePolicy) -> ModerationResult {
    if result.status != ModerationStatus::InProgress {
        return *result;
    }

    match policy {
        ClosePolicy::Escalate => ModerationResult {
            status: ModerationStatus::RequiresEscalation,
            winner: None,
            victory_factor: 0,
            reason: Reason::Escalated,
            ..*result
        },
        ClosePolicy::AutoAccept => force(result, VoteChoice::Yes),
        ClosePolicy::AutoReject => force(result, VoteChoice::No),
        ClosePolicy::ExtendByHours(hours) => ModerationResult {
            reason: Reason::WindowExtended { hours },
            ..*result
        },
    }
}

fn force(result: &ModerationResult, winner: VoteChoice) -> ModerationResult {
    let (status, reason) = match winner {
        VoteChoice::Yes => (ModerationStatus::Validated, Reason::AutoAccepted),
        VoteChoice::No => (ModerationStatus::Rejected, Reason::AutoRejected),
    };
    ModerationResult {
        status,
        winner: Some(winner),
        victory_factor: victory_factor(result.score(winner), result.score(winner.opposite())),
        reason,
        ..*result
    }
}
