//! Shared test helpers for scenario and property tests.

use arbiter_core::constants::SCALE;
use arbiter_core::types::{Participant, StakeTally, TallySnapshot, VoteChoice, VoteTally};

/// Whole tokens in scaled units.
pub fn tokens(n: u128) -> u128 {
    n * SCALE
}

/// Build a snapshot with a 1:1 exchange rate.
pub fn snapshot(votes_yes: u64, votes_no: u64, stake_yes: u128, stake_no: u128, mint: u128) -> TallySnapshot {
    TallySnapshot::new(
        VoteTally::new(votes_yes, votes_no),
        StakeTally::new(stake_yes, stake_no),
        mint,
    )
}

/// `count` voters on `side`, splitting `total_stake` evenly (remainder to the
/// first voter) so the list matches the side's tally exactly.
pub fn voters(prefix: &str, side: VoteChoice, count: usize, total_stake: u128) -> Vec<Participant> {
    if count == 0 {
        return Vec::new();
    }
    let each = total_stake / count as u128;
    let remainder = total_stake - each * count as u128;
    (0..count)
        .map(|i| {
            let stake = if i == 0 { each + remainder } else { each };
            Participant::active(format!("{prefix}{i}"), stake, side)
        })
        .collect()
}

/// Active participants consistent with `tally`.
pub fn participants_for(tally: &TallySnapshot) -> Vec<Participant> {
    let mut all = voters("yes", VoteChoice::Yes, tally.votes.yes as usize, tally.stakes.yes);
    all.extend(voters("no", VoteChoice::No, tally.votes.no as usize, tally.stakes.no));
    all
}
